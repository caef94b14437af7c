//! POP parser — AST types and the combinator grammar
//!
//! Converts one logical command line into a [`Command`]. Lines come from
//! the normalizer, so the parser never sees comments, blank lines, or
//! unmerged table blocks.

pub mod ast;
pub mod grammar;

use crate::{Error, Result};
use ast::Command;
use grammar::GrammarErrorKind;

/// Parse one logical command line into a [`Command`].
///
/// The whole line must be consumed; leftover text means none of the
/// command shapes actually fit.
///
/// # Guarantees
/// - Deterministic: same line always produces the same command
/// - Total over the catalog: every recognized keyword leads either to a
///   parsed command or to a diagnosable error, never a silent drop
///
/// # Errors
/// - [`Error::GrammarMismatch`] when no command shape matches the line
/// - [`Error::AmbiguousKeyword`] when a keyword fragment abbreviates more
///   than one catalog entry
pub fn parse_command(line: &str) -> Result<Command> {
    match grammar::command(line) {
        Ok((rest, command)) if rest.trim().is_empty() => Ok(command),
        Ok(_) => Err(mismatch(line)),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => match e.kind {
            GrammarErrorKind::Ambiguous { candidate, matches } => {
                Err(Error::AmbiguousKeyword { candidate, matches })
            }
            GrammarErrorKind::Nom(_) => Err(mismatch(line)),
        },
        Err(nom::Err::Incomplete(_)) => Err(mismatch(line)),
    }
}

fn mismatch(line: &str) -> Error {
    Error::GrammarMismatch {
        line: line.to_string(),
        tokens: line.split_whitespace().map(str::to_string).collect(),
    }
}
