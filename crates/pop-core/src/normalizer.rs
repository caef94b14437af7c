//! Line normalizer — converts raw POP text into logical command lines
//!
//! Raw POP files are free-form: tabs, blank lines, `$`-comment lines, and
//! multi-line TABLE_VALUES blocks. The grammar works one command per line,
//! so normalization happens first.
//!
//! # Pipeline
//!
//! `raw text → tabs to spaces → split lines → collapse whitespace →
//!  drop comments → merge table blocks → logical command lines`
//!
//! # Guarantees
//!
//! - Order preserving: non-comment, non-blank lines keep their relative
//!   order, with each table block collapsed to exactly one element.
//! - Idempotent on already-normalized input.

use crate::keywords::{expand_keyword, keyword_span, POP_COMMANDS};
use crate::{Error, Result};

/// Normalize raw POP source text into logical command lines.
///
/// # Errors
/// Returns [`Error::UnterminatedTable`] when a TABLE_VALUES block reaches
/// end of input without a TABLE_END line.
pub fn normalize(input: &str) -> Result<Vec<String>> {
    let cleaned = input.replace('\t', " ");

    let lines = cleaned
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_comment(line));

    merge_table_blocks(lines)
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comment lines start with `$` or the `@@` sentinel and must never reach
/// the grammar.
fn is_comment(line: &str) -> bool {
    line.starts_with('$') || line.starts_with("@@")
}

/// Resolve the first word of a line against the command catalog, if it
/// resolves at all. Used only for table-block detection, so resolution
/// failures are simply "not a table boundary".
fn leading_command(line: &str) -> Option<&'static str> {
    let fragment = &line[..keyword_span(line)];
    expand_keyword(POP_COMMANDS, fragment).ok()
}

/// Whether the last whitespace-delimited word of a line resolves to
/// TABLE_END, i.e. the table block opens and closes on one source line.
fn ends_table(line: &str) -> bool {
    line.rsplit(' ')
        .next()
        .and_then(|word| expand_keyword(POP_COMMANDS, word).ok())
        == Some("TABLE_END")
}

/// Merge each TABLE_VALUES..TABLE_END block into one logical line: captured
/// rows are comma-joined onto the opening line, the terminator line is
/// space-joined. The grammar's table-values rule expects all numeric rows
/// plus the terminator as one logical unit.
fn merge_table_blocks(lines: impl Iterator<Item = String>) -> Result<Vec<String>> {
    let mut merged = Vec::new();
    let mut capture: Option<String> = None;

    for line in lines {
        match capture.take() {
            None => {
                if leading_command(&line) == Some("TABLE_VALUES") && !ends_table(&line) {
                    capture = Some(line);
                } else {
                    merged.push(line);
                }
            }
            Some(mut block) => {
                if leading_command(&line) == Some("TABLE_END") {
                    block.push(' ');
                    block.push_str(&line);
                    merged.push(block);
                } else {
                    block.push_str(", ");
                    block.push_str(&line);
                    capture = Some(block);
                }
            }
        }
    }

    match capture {
        Some(block) => Err(Error::UnterminatedTable { start: block }),
        None => Ok(merged),
    }
}
