//! POP Core - conversion of POP equilibrium-description files
//!
//! POP files script a thermodynamic optimizer: they describe measured
//! equilibria as command sequences. This crate turns that command language
//! into structured equilibrium records.
//!
//! # Architecture
//!
//! ```text
//! POP Text → Normalizer → logical lines
//!                ↓
//!             Parser → commands (abbreviations resolved, shapes typed)
//!                ↓
//!          Interpreter → equilibrium records → Document
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: Same input always produces identical output
//! - **Partial-failure tolerant**: commands without conversion semantics
//!   are reported and skipped; only malformed input aborts a run
//! - **Ordered**: record fields iterate in sorted order, so serialized
//!   documents are stable

use std::collections::BTreeMap;

pub mod algebra;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod keywords;
pub mod normalizer;
pub mod parser;

pub use algebra::Expr;
pub use error::{Error, Result};
pub use interpreter::Interpreter;
pub use parser::ast::{ExperimentTarget, Relation, Uncertainty, ValueToken};

/// One measured quantity, with its value lifted into an expression
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Experiment {
    pub target: ExperimentTarget,
    pub relation: Relation,
    pub value: Expr,
    pub uncertainty: Uncertainty,
}

/// One equilibrium: the phase configuration, the symbols in scope, and the
/// measurements attached to it
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EquilibriumRecord {
    /// Phase name to amount, from the last CHANGE_STATUS
    pub phases: BTreeMap<String, f64>,
    /// Named constants, functions, and variables
    pub symbols: BTreeMap<String, Expr>,
    /// Measured quantities, in command order
    pub experiments: Vec<Experiment>,
    /// Words of the last LABEL_DATA
    pub label: Vec<String>,
    /// Rows of the last TABLE_VALUES block
    pub table_values: Vec<Vec<f64>>,
}

/// The converted form of one POP file. The first record is always the
/// global symbol table — everything declared before the first
/// CREATE_NEW_EQUILIBRIUM — followed by one record per equilibrium.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub records: Vec<EquilibriumRecord>,
}

/// Sink for per-command skip reports during conversion
pub trait Diagnostics {
    /// Called once per skipped command with the source line and the
    /// feature the interpreter has no semantics for
    fn skipped(&mut self, line: &str, feature: &str);
}

/// Discards all reports
#[derive(Debug, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn skipped(&mut self, _line: &str, _feature: &str) {}
}

/// Convert POP text into a document.
///
/// Parse errors are fatal. Commands the interpreter cannot fold are
/// reported through `diagnostics` and skipped.
///
/// # Errors
/// Any [`Error`] except [`Error::Unimplemented`], which is consumed here.
pub fn convert(input: &str, diagnostics: &mut dyn Diagnostics) -> Result<Document> {
    let lines = normalizer::normalize(input)?;
    let mut interpreter = Interpreter::new();
    for line in &lines {
        let command = parser::parse_command(line)?;
        match interpreter.apply(&command) {
            Ok(()) => {}
            Err(Error::Unimplemented(feature)) => diagnostics.skipped(line, &feature),
            Err(fatal) => return Err(fatal),
        }
    }
    Ok(interpreter.finish())
}

/// [`convert`] without diagnostics
pub fn convert_str(input: &str) -> Result<Document> {
    convert(input, &mut NullDiagnostics)
}
