//! Error types for the POP conversion pipeline
//!
//! All fallible operations return `Result<T, Error>`.
//! Three disjoint failure classes flow through the one enum:
//!
//! - Fatal parse errors (`UnknownKeyword`, `AmbiguousKeyword`,
//!   `GrammarMismatch`, `UnterminatedTable`) abort a conversion run.
//! - `Unimplemented` is the partial-failure channel: the driver catches it
//!   per command, reports the skip, and keeps processing.
//! - `Expression` marks a defect in the expression builder. The grammar
//!   should never hand it an unbuildable token run, so it propagates fatal.

/// POP conversion error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Candidate text matches no catalog keyword
    #[error("unknown keyword '{0}'")]
    UnknownKeyword(String),

    /// Candidate text abbreviates more than one catalog keyword
    #[error("'{candidate}' is ambiguous: matches {matches:?}")]
    AmbiguousKeyword {
        candidate: String,
        matches: Vec<&'static str>,
    },

    /// A logical line matched none of the recognized command shapes
    #[error("no command shape matches '{line}' (tokens: {tokens:?})")]
    GrammarMismatch { line: String, tokens: Vec<String> },

    /// A TABLE_VALUES block reached end of input without TABLE_END
    #[error("table block '{start}' has no TABLE_END terminator")]
    UnterminatedTable { start: String },

    /// The expression builder produced text the algebra parser rejects
    #[error("malformed expression '{0}'")]
    Expression(String),

    /// Deliberately unsupported command or branch
    #[error("not implemented: {0}")]
    Unimplemented(String),
}

/// Result type alias for POP conversion operations
pub type Result<T> = std::result::Result<T, Error>;
