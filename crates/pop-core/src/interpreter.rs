//! Command interpreter — folds parsed commands into equilibrium records
//!
//! The interpreter owns one mutable record under construction plus the
//! sealed records before it. The record it starts with is the global
//! symbol table: whatever the file declares before its first
//! CREATE_NEW_EQUILIBRIUM. Each CREATE_NEW_EQUILIBRIUM seals the current
//! record and starts a fresh one, so the global table is always the first
//! record of the finished document; every other implemented command
//! mutates the current record only.
//!
//! Commands the catalog recognizes but the fold has no semantics for
//! raise [`Error::Unimplemented`]. The conversion driver catches that
//! variant per command and keeps going, so one exotic command never sinks
//! a whole file.
//!
//! # Determinism
//!
//! The fold is pure — no I/O, no randomness, no system time. Same command
//! sequence, same document.

use crate::expr;
use crate::parser::ast::*;
use crate::{Document, EquilibriumRecord, Error, Experiment, Result};

/// Stateful fold from commands to a [`Document`]
#[derive(Debug, Default)]
pub struct Interpreter {
    sealed: Vec<EquilibriumRecord>,
    current: EquilibriumRecord,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one command to the record under construction.
    ///
    /// # Errors
    /// [`Error::Unimplemented`] for recognized commands without fold
    /// semantics. The current record is left untouched in that case.
    pub fn apply(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::NewEquilibrium { init_code, .. } => self.new_equilibrium(*init_code),
            Command::ChangeStatus { phases, status } => self.change_status(phases, status),
            Command::EnterSymbol(decl) => self.enter_symbol(decl),
            Command::TableValues { rows } => {
                self.current.table_values = rows.clone();
                Ok(())
            }
            Command::LabelData(words) => {
                self.current.label = words.clone();
                Ok(())
            }
            Command::Experiment(items) => {
                self.current.experiments.extend(items.iter().map(|item| Experiment {
                    target: item.target.clone(),
                    relation: item.relation,
                    value: expr::from_value(&item.value),
                    uncertainty: item.uncertainty.clone(),
                }));
                Ok(())
            }
            // Declares the column count the rows already carry
            Command::TableHead { .. } => Ok(()),
            Command::SaveWorkspace => Ok(()),
            Command::Passthrough(_) => Ok(()),
            Command::SetCondition(_) => Err(Error::Unimplemented("SET_CONDITION".to_string())),
            Command::SetReferenceState { .. } => {
                Err(Error::Unimplemented("SET_REFERENCE_STATE".to_string()))
            }
            Command::SetStartValue { .. } => {
                Err(Error::Unimplemented("SET_START_VALUE".to_string()))
            }
            Command::DefineComponents => {
                Err(Error::Unimplemented("DEFINE_COMPONENTS".to_string()))
            }
        }
    }

    /// Seal the fold and hand over the finished document. The record
    /// under construction always goes out, so the document starts with
    /// the global symbol table even when nothing was declared in it.
    pub fn finish(mut self) -> Document {
        self.sealed.push(self.current);
        Document {
            records: self.sealed,
        }
    }

    // ── Command handlers ───────────────────────────────────

    // Initiation code 1 starts a plain equilibrium; 0 (suspended) and 2
    // (everything entered) describe solver start states the record format
    // has no slot for
    fn new_equilibrium(&mut self, init_code: i64) -> Result<()> {
        if init_code != 1 {
            return Err(Error::Unimplemented(format!(
                "CREATE_NEW_EQUILIBRIUM initiation code {init_code}"
            )));
        }
        self.sealed.push(std::mem::take(&mut self.current));
        Ok(())
    }

    // FIXED and ENTERED describe the equilibrium itself, so they replace
    // the whole phase map; DORMANT and SUSPENDED configure the solver and
    // leave the record alone
    fn change_status(&mut self, phases: &PhaseList, status: &PhaseStatus) -> Result<()> {
        let amount = match status {
            PhaseStatus::Fixed(v) | PhaseStatus::Entered(v) => *v,
            PhaseStatus::Dormant | PhaseStatus::Suspended => return Ok(()),
        };
        let names = match phases {
            PhaseList::Named(names) => names,
            PhaseList::All => {
                return Err(Error::Unimplemented(
                    "CHANGE_STATUS for the phase wildcard".to_string(),
                ))
            }
        };
        self.current.phases = names
            .iter()
            .map(|name| (name.clone(), amount))
            .collect();
        Ok(())
    }

    fn enter_symbol(&mut self, decl: &SymbolDecl) -> Result<()> {
        match decl {
            SymbolDecl::Constants(assignments) => {
                for assignment in assignments {
                    self.current
                        .symbols
                        .insert(assignment.name.clone(), expr::from_value(&assignment.value));
                }
                Ok(())
            }
            SymbolDecl::Function { name, tokens } | SymbolDecl::Variable { name, tokens } => {
                let built = expr::build(tokens)?;
                self.current.symbols.insert(name.clone(), built);
                Ok(())
            }
            SymbolDecl::Table => Err(Error::Unimplemented("ENTER_SYMBOL TABLE".to_string())),
        }
    }
}
