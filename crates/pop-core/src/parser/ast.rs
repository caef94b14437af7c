//! POP AST types — one variant per recognized command shape
//!
//! These types represent the parsed structure of a single logical POP line.
//! They carry exactly what the interpreter needs and nothing positional:
//! abbreviations are already expanded, numbers already converted.
//!
//! All AST types are immutable after construction and derive:
//! Debug, Clone, PartialEq, Serialize, Deserialize

use serde::{Deserialize, Serialize};

/// Relational operator in conditions, experiments, and assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
}

impl Relation {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '=' => Some(Relation::Eq),
            '<' => Some(Relation::Lt),
            '>' => Some(Relation::Gt),
            _ => None,
        }
    }
}

/// Phase argument list of a property reference: `HM(LIQUID)`, `X(LIQUID,NI)`,
/// or the wildcard `ACR(*)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhaseList {
    All,
    Named(Vec<String>),
}

/// A thermodynamic property applied to phases, e.g. `HM(LIQUID)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRef {
    pub property: String,
    pub phases: PhaseList,
}

/// Right-hand-side value of a condition or experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueToken {
    Float(f64),
    Int(i64),
    /// Reference to a labelled value, written `@3`
    Label(u32),
    Symbol(String),
}

/// Measurement uncertainty, `:10` (absolute) or `:5%` (relative)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uncertainty {
    pub value: f64,
    pub percent: bool,
}

/// Target status of a CHANGE_STATUS command. FIXED and ENTERED carry the
/// phase amount; DORMANT and SUSPENDED do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhaseStatus {
    Fixed(f64),
    Entered(f64),
    Dormant,
    Suspended,
}

/// Equilibrium identifier of CREATE_NEW_EQUILIBRIUM: an explicit number or
/// the `@@` auto-assign marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EquilibriumId {
    Auto,
    Numbered(i64),
}

/// A `NAME = value` assignment, as in ENTER_SYMBOL CONSTANT lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstAssign {
    pub name: String,
    pub relation: Relation,
    pub value: ValueToken,
}

/// Payload of ENTER_SYMBOL, by symbol kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolDecl {
    /// `ENTER_SYMBOL CONSTANT A=1, B=2`
    Constants(Vec<ConstAssign>),
    /// `ENTER_SYMBOL FUNCTION NAME = <expression tokens> ;`
    Function { name: String, tokens: Vec<ExprToken> },
    /// `ENTER_SYMBOL VARIABLE NAME = <expression tokens> ;`
    Variable { name: String, tokens: Vec<ExprToken> },
    Table,
}

/// One term of an arithmetic condition, e.g. the `2*MUR(CR)` in
/// `SET_CONDITION 2*MUR(CR)+3*MUR(NI)=-191000`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithTerm {
    pub coefficient: Option<i64>,
    pub property: PropertyRef,
    /// Sign joining this term to the next, `+` or `-`; absent on the last
    pub sign: Option<char>,
}

/// The shape of one SET_CONDITION clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Linear combination of properties, `2*MUR(CR)+3*MUR(NI)=-191000`
    Arithmetic {
        terms: Vec<ArithTerm>,
        relation: Relation,
        value: ValueToken,
    },
    /// Single property, `X(LIQUID,NI)=0.1`
    Property {
        property: PropertyRef,
        relation: Relation,
        value: ValueToken,
    },
    /// Bare name, `P=101325`
    Constant(ConstAssign),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub uncertainty: Option<Uncertainty>,
}

/// Left-hand side of an EXPERIMENT clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExperimentTarget {
    Property(PropertyRef),
    Constant(String),
}

/// One measured quantity of an EXPERIMENT command. Every measurement
/// carries its uncertainty; the grammar rejects items without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentItem {
    pub target: ExperimentTarget,
    pub relation: Relation,
    pub value: ValueToken,
    pub uncertainty: Uncertainty,
}

/// Token of an ENTER_SYMBOL expression body, before algebraic assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprToken {
    Num(f64),
    Int(i64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    /// The `.` derivative marker
    Deriv,
    /// A table-column reference, written `@3`
    ColumnRef(u32),
    Property(PropertyRef),
}

/// Catalog commands accepted and deliberately ignored. They configure the
/// optimizer session rather than describe equilibria, so they carry no
/// payload here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassthroughKind {
    AdvancedOptions,
    Comment,
    EvaluateFunctions,
    Export,
    FlushBuffer,
    Import,
    SetAllStartValues,
    SetAlternateCondition,
    SetNumericalLimits,
    SetWeight,
}

/// A fully parsed logical POP line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// `CREATE_NEW_EQUILIBRIUM @@ 1` or `CREATE_NEW_EQUILIBRIUM 100, 1`
    NewEquilibrium { id: EquilibriumId, init_code: i64 },
    /// `CHANGE_STATUS PHASE LIQUID = FIXED 1`
    ChangeStatus {
        phases: PhaseList,
        status: PhaseStatus,
    },
    EnterSymbol(SymbolDecl),
    /// `TABLE_HEAD 2` — declares the number of value columns
    TableHead { columns: i64 },
    /// A merged `TABLE_VALUES .. TABLE_END` block, row-major
    TableValues { rows: Vec<Vec<f64>> },
    /// `SET_REFERENCE_STATE CR LIQUID`
    SetReferenceState { component: String, phase: String },
    SetCondition(Vec<Condition>),
    LabelData(Vec<String>),
    Experiment(Vec<ExperimentItem>),
    /// `SET_START_VALUE T=1000`
    SetStartValue {
        property: PropertyRef,
        relation: Relation,
        value: ValueToken,
    },
    SaveWorkspace,
    DefineComponents,
    Passthrough(PassthroughKind),
}
