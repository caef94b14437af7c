//! Keyword catalogs and abbreviation resolution
//!
//! POP commands may be abbreviated segment by segment: `TAB_HEAD` resolves
//! to `TABLE_HEAD`, `CH-ST` to `CHANGE_STATUS`, `EXP` to nothing useful
//! because three catalog entries start with it. Resolution is a pure
//! function of (catalog, candidate) and is deterministic by construction:
//! the catalogs are sorted and scanned in order.
//!
//! Reference: Thermo-Calc Data Optimization User Guide, POP-file syntax.

use crate::{Error, Result};

/// Canonical POP command names, sorted
pub const POP_COMMANDS: &[&str] = &[
    "ADVANCED_OPTIONS",
    "CHANGE_STATUS",
    "COMMENT",
    "CREATE_NEW_EQUILIBRIUM",
    "DEFINE_COMPONENTS",
    "ENTER_SYMBOL",
    "EVALUATE_FUNCTIONS",
    "EXPERIMENT",
    "EXPORT",
    "FLUSH_BUFFER",
    "IMPORT",
    "LABEL_DATA",
    "SAVE_WORKSPACE",
    "SET_ALL_START_VALUES",
    "SET_ALTERNATE_CONDITION",
    "SET_CONDITION",
    "SET_NUMERICAL_LIMITS",
    "SET_REFERENCE_STATE",
    "SET_START_VALUE",
    "SET_WEIGHT",
    "TABLE_END",
    "TABLE_HEAD",
    "TABLE_VALUES",
];

/// Status-change target kinds (only PHASE has an implemented handler)
pub const STATUS_TARGETS: &[&str] = &["COMPONENTS", "PHASE", "SPECIES"];

/// Phase status keywords for CHANGE_STATUS
pub const PHASE_STATUSES: &[&str] = &["DORMANT", "ENTERED", "FIXED", "SUSPENDED"];

/// Symbol kind keywords for ENTER_SYMBOL
pub const SYMBOL_KINDS: &[&str] = &["CONSTANT", "FUNCTION", "TABLE", "VARIABLE"];

/// Characters that terminate a keyword occurrence inside a command line.
/// Scanning for the nearest of these (rather than splitting on whitespace)
/// is what lets keywords abut punctuation, e.g. `PHASE(LIQUID)`.
const KEYWORD_DELIMITERS: &[char] = &[' ', '(', ')', ':', ','];

/// Length of the keyword fragment at the start of `input`: the distance to
/// the nearest delimiter, or the whole input if none occurs.
pub fn keyword_span(input: &str) -> usize {
    input.find(KEYWORD_DELIMITERS).unwrap_or(input.len())
}

/// Expand an abbreviated keyword against a catalog.
///
/// The candidate is case-folded, split on `_`/`-`, and each segment must be
/// a prefix of the corresponding underscore-delimited chunk of a canonical
/// keyword; the final segment matches as a prefix of the entire remainder.
///
/// # Errors
/// - [`Error::UnknownKeyword`] when no catalog entry matches.
/// - [`Error::AmbiguousKeyword`] when more than one matches; this is a hard
///   parse error, not an unimplemented-feature condition.
pub fn expand_keyword(catalog: &[&'static str], candidate: &str) -> Result<&'static str> {
    let folded = candidate.to_ascii_uppercase().replace('-', "_");
    let segments: Vec<&str> = folded.split('_').collect();

    let matches: Vec<&'static str> = catalog
        .iter()
        .copied()
        .filter(|canonical| segments_match(canonical, &segments))
        .collect();

    match matches.len() {
        0 => Err(Error::UnknownKeyword(candidate.to_string())),
        1 => Ok(matches[0]),
        _ => Err(Error::AmbiguousKeyword {
            candidate: candidate.to_string(),
            matches,
        }),
    }
}

/// Match candidate segments against the underscore-delimited chunks of one
/// canonical keyword.
fn segments_match(canonical: &str, segments: &[&str]) -> bool {
    let mut rest = canonical;
    for (idx, segment) in segments.iter().enumerate() {
        if idx == segments.len() - 1 {
            // Final segment: prefix of everything that remains
            return rest.starts_with(segment);
        }
        // Interior segment: prefix of the next chunk, which must be
        // followed by an underscore for the remaining segments
        match rest.split_once('_') {
            Some((chunk, tail)) if chunk.starts_with(segment) => rest = tail,
            _ => return false,
        }
    }
    true
}
