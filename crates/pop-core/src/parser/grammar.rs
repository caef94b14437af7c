//! Combinator grammar for logical POP lines
//!
//! One rule per recognized command shape, combined with `alt`. Every rule
//! starts by resolving the leading keyword fragment through the catalog, so
//! abbreviations select the rule exactly like canonical spellings do.
//!
//! Keyword resolution failures map onto nom's two error levels:
//! an unknown or non-matching fragment is a recoverable `Error` (the next
//! alternative gets its turn), an ambiguous fragment is a `Failure` that
//! aborts the whole alternation. Ambiguity is a property of the input, not
//! of the rule that happened to be trying it.

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, digit0, digit1, one_of, space0};
use nom::combinator::{map, map_opt, map_res, opt, recognize, rest, value};
use nom::multi::{many0, many1, separated_list1};
use nom::sequence::{pair, preceded, terminated, tuple};
use nom::IResult;

use crate::keywords::{
    expand_keyword, keyword_span, PHASE_STATUSES, POP_COMMANDS, STATUS_TARGETS, SYMBOL_KINDS,
};
use crate::parser::ast::*;
use crate::Error;

// ── Error type ─────────────────────────────────────────────

/// Grammar-level error: either an ordinary nom backtrack or a hard
/// keyword-ambiguity failure.
#[derive(Debug, PartialEq)]
pub struct GrammarError<'a> {
    pub input: &'a str,
    pub kind: GrammarErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum GrammarErrorKind {
    Nom(nom::error::ErrorKind),
    Ambiguous {
        candidate: String,
        matches: Vec<&'static str>,
    },
}

impl<'a> nom::error::ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, kind: nom::error::ErrorKind) -> Self {
        GrammarError {
            input,
            kind: GrammarErrorKind::Nom(kind),
        }
    }

    fn append(_input: &'a str, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a, E> nom::error::FromExternalError<&'a str, E> for GrammarError<'a> {
    fn from_external_error(input: &'a str, kind: nom::error::ErrorKind, _e: E) -> Self {
        GrammarError {
            input,
            kind: GrammarErrorKind::Nom(kind),
        }
    }
}

pub type PResult<'a, T> = IResult<&'a str, T, GrammarError<'a>>;

fn backtrack(input: &str) -> nom::Err<GrammarError<'_>> {
    nom::Err::Error(GrammarError {
        input,
        kind: GrammarErrorKind::Nom(nom::error::ErrorKind::Tag),
    })
}

// ── Keyword resolution ─────────────────────────────────────

/// Resolve the keyword fragment at the head of `input` against a catalog.
/// Ambiguity escalates to `Failure` so no other alternative can mask it.
fn resolve_keyword<'a>(
    catalog: &'static [&'static str],
    input: &'a str,
) -> PResult<'a, &'static str> {
    let (input, _) = space0(input)?;
    let span = keyword_span(input);
    if span == 0 {
        return Err(backtrack(input));
    }
    match expand_keyword(catalog, &input[..span]) {
        Ok(resolved) => Ok((&input[span..], resolved)),
        Err(Error::AmbiguousKeyword { candidate, matches }) => Err(nom::Err::Failure(
            GrammarError {
                input,
                kind: GrammarErrorKind::Ambiguous { candidate, matches },
            },
        )),
        Err(_) => Err(backtrack(input)),
    }
}

/// Parser for one specific canonical keyword, abbreviations included.
fn kw<'a>(
    catalog: &'static [&'static str],
    canonical: &'static str,
) -> impl FnMut(&'a str) -> PResult<'a, &'static str> {
    move |input| {
        let (rest, resolved) = resolve_keyword(catalog, input)?;
        if resolved == canonical {
            Ok((rest, resolved))
        } else {
            Err(backtrack(input))
        }
    }
}

// ── Lexical helpers ────────────────────────────────────────

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    nom::sequence::delimited(space0, inner, space0)
}

/// Phase, component, property, and symbol names
fn symbol_name(input: &str) -> PResult<'_, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == ':')(input)
}

fn exponent(input: &str) -> PResult<'_, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

/// A number that is unmistakably floating point: it carries a decimal
/// point or an exponent. Plain digit runs stay integers.
fn float_number(input: &str) -> PResult<'_, f64> {
    map_res(
        recognize(pair(
            opt(one_of("+-")),
            alt((
                recognize(tuple((digit0, char('.'), digit0, opt(exponent)))),
                recognize(pair(digit1, exponent)),
            )),
        )),
        str::parse::<f64>,
    )(input)
}

fn int_number(input: &str) -> PResult<'_, i64> {
    map_res(
        recognize(pair(opt(one_of("+-")), digit1)),
        str::parse::<i64>,
    )(input)
}

/// Any numeric literal, widened to f64
fn numeric(input: &str) -> PResult<'_, f64> {
    alt((float_number, map(int_number, |i| i as f64)))(input)
}

/// `@3` — reference into labelled data or a table column
fn label_ref(input: &str) -> PResult<'_, u32> {
    preceded(char('@'), map_res(digit1, str::parse::<u32>))(input)
}

fn relation_op(input: &str) -> PResult<'_, Relation> {
    map_opt(one_of("=<>"), Relation::from_char)(input)
}

/// Right-hand-side value; float wins over int so `1.0` never truncates
fn value_token(input: &str) -> PResult<'_, ValueToken> {
    alt((
        map(float_number, ValueToken::Float),
        map(int_number, ValueToken::Int),
        map(label_ref, ValueToken::Label),
        map(symbol_name, |s| ValueToken::Symbol(s.to_string())),
    ))(input)
}

/// `:10` or `:5%` trailing a measured value
fn uncertainty(input: &str) -> PResult<'_, Uncertainty> {
    map(
        tuple((ws(char(':')), numeric, opt(char('%')))),
        |(_, value, percent)| Uncertainty {
            value,
            percent: percent.is_some(),
        },
    )(input)
}

// ── Shared clause shapes ───────────────────────────────────

fn phase_list(input: &str) -> PResult<'_, PhaseList> {
    alt((
        value(PhaseList::All, char('*')),
        map(
            many1(terminated(ws(symbol_name), opt(ws(char(','))))),
            |names| PhaseList::Named(names.into_iter().map(str::to_string).collect()),
        ),
    ))(input)
}

/// `HM(LIQUID)`, `X(LIQUID,NI)`, `ACR(*)`
fn property_ref(input: &str) -> PResult<'_, PropertyRef> {
    map(
        tuple((ws(symbol_name), char('('), ws(phase_list), char(')'))),
        |(property, _, phases, _)| PropertyRef {
            property: property.to_string(),
            phases,
        },
    )(input)
}

/// `NAME = value`
fn const_assign(input: &str) -> PResult<'_, ConstAssign> {
    map(
        tuple((ws(symbol_name), relation_op, ws(value_token))),
        |(name, relation, value)| ConstAssign {
            name: name.to_string(),
            relation,
            value,
        },
    )(input)
}

/// `HM(LIQUID) = 1000`
fn property_clause(input: &str) -> PResult<'_, (PropertyRef, Relation, ValueToken)> {
    tuple((property_ref, ws(relation_op), ws(value_token)))(input)
}

/// `2*MUR(CR)+` — one summand of an arithmetic condition
fn arith_term(input: &str) -> PResult<'_, ArithTerm> {
    map(
        tuple((
            opt(terminated(
                ws(map_res(digit1, str::parse::<i64>)),
                ws(char('*')),
            )),
            property_ref,
            opt(ws(one_of("+-"))),
        )),
        |(coefficient, property, sign)| ArithTerm {
            coefficient,
            property,
            sign,
        },
    )(input)
}

/// Property-based condition clause. A single bare term collapses to the
/// simple property shape; coefficients or joined terms stay arithmetic.
fn property_condition(input: &str) -> PResult<'_, ConditionKind> {
    let (rest, (terms, relation, value)) =
        tuple((many1(arith_term), ws(relation_op), ws(value_token)))(input)?;
    let kind = match terms.as_slice() {
        [term] if term.coefficient.is_none() && term.sign.is_none() => ConditionKind::Property {
            property: term.property.clone(),
            relation,
            value,
        },
        _ => ConditionKind::Arithmetic {
            terms,
            relation,
            value,
        },
    };
    Ok((rest, kind))
}

fn condition(input: &str) -> PResult<'_, Condition> {
    map(
        tuple((
            alt((property_condition, map(const_assign, ConditionKind::Constant))),
            opt(uncertainty),
        )),
        |(kind, uncertainty)| Condition { kind, uncertainty },
    )(input)
}

// The uncertainty suffix is mandatory: a measurement without one is not
// an experiment
fn experiment_item(input: &str) -> PResult<'_, ExperimentItem> {
    map(
        tuple((
            alt((
                map(property_clause, |(property, relation, value)| {
                    (ExperimentTarget::Property(property), relation, value)
                }),
                map(const_assign, |c| {
                    (ExperimentTarget::Constant(c.name), c.relation, c.value)
                }),
            )),
            uncertainty,
        )),
        |((target, relation, value), uncertainty)| ExperimentItem {
            target,
            relation,
            value,
            uncertainty,
        },
    )(input)
}

// ── Expression tokens ──────────────────────────────────────

/// One token of an ENTER_SYMBOL function or variable body. Operators come
/// before numbers so a `+`/`-` joining two operands is never read as the
/// sign of the number that follows it.
fn expr_token(input: &str) -> PResult<'_, ExprToken> {
    alt((
        map(property_ref, ExprToken::Property),
        map(one_of("+-*/^"), ExprToken::Op),
        map(float_number, ExprToken::Num),
        map(label_ref, ExprToken::ColumnRef),
        value(ExprToken::LParen, char('(')),
        value(ExprToken::RParen, char(')')),
        value(ExprToken::Deriv, char('.')),
        map(int_number, ExprToken::Int),
        map(symbol_name, |s| ExprToken::Ident(s.to_string())),
    ))(input)
}

/// `NAME = tokens... ;`
fn symbol_body(input: &str) -> PResult<'_, (String, Vec<ExprToken>)> {
    map(
        tuple((
            ws(symbol_name),
            char('='),
            many1(ws(expr_token)),
            opt(ws(char(';'))),
        )),
        |(name, _, tokens, _)| (name.to_string(), tokens),
    )(input)
}

// ── Command rules ──────────────────────────────────────────

fn equilibrium_id(input: &str) -> PResult<'_, EquilibriumId> {
    alt((
        value(
            EquilibriumId::Auto,
            take_while1(|c| c == '@' || c == ','),
        ),
        map(int_number, EquilibriumId::Numbered),
    ))(input)
}

fn cmd_equilibrium(input: &str) -> PResult<'_, Command> {
    map(
        tuple((
            kw(POP_COMMANDS, "CREATE_NEW_EQUILIBRIUM"),
            ws(equilibrium_id),
            opt(ws(char(','))),
            ws(int_number),
        )),
        |(_, id, _, init_code)| Command::NewEquilibrium { id, init_code },
    )(input)
}

fn phase_status(input: &str) -> PResult<'_, PhaseStatus> {
    alt((
        map(
            preceded(kw(PHASE_STATUSES, "FIXED"), ws(numeric)),
            PhaseStatus::Fixed,
        ),
        map(
            preceded(kw(PHASE_STATUSES, "ENTERED"), ws(numeric)),
            PhaseStatus::Entered,
        ),
        value(PhaseStatus::Dormant, kw(PHASE_STATUSES, "DORMANT")),
        value(PhaseStatus::Suspended, kw(PHASE_STATUSES, "SUSPENDED")),
    ))(input)
}

// Only the PHASE target parses; COMPONENTS and SPECIES status changes have
// no record shape to land in yet
fn cmd_change_status(input: &str) -> PResult<'_, Command> {
    map(
        tuple((
            kw(POP_COMMANDS, "CHANGE_STATUS"),
            kw(STATUS_TARGETS, "PHASE"),
            ws(phase_list),
            char('='),
            ws(phase_status),
        )),
        |(_, _, phases, _, status)| Command::ChangeStatus { phases, status },
    )(input)
}

fn cmd_enter_symbol(input: &str) -> PResult<'_, Command> {
    preceded(
        kw(POP_COMMANDS, "ENTER_SYMBOL"),
        map(symbol_decl, Command::EnterSymbol),
    )(input)
}

fn symbol_decl(input: &str) -> PResult<'_, SymbolDecl> {
    alt((
        map(
            preceded(
                kw(SYMBOL_KINDS, "CONSTANT"),
                many1(terminated(ws(const_assign), opt(ws(char(','))))),
            ),
            SymbolDecl::Constants,
        ),
        map(
            preceded(kw(SYMBOL_KINDS, "FUNCTION"), symbol_body),
            |(name, tokens)| SymbolDecl::Function { name, tokens },
        ),
        map(
            preceded(kw(SYMBOL_KINDS, "VARIABLE"), symbol_body),
            |(name, tokens)| SymbolDecl::Variable { name, tokens },
        ),
        value(SymbolDecl::Table, kw(SYMBOL_KINDS, "TABLE")),
    ))(input)
}

fn cmd_table_head(input: &str) -> PResult<'_, Command> {
    map(
        preceded(kw(POP_COMMANDS, "TABLE_HEAD"), ws(int_number)),
        |columns| Command::TableHead { columns },
    )(input)
}

// The normalizer hands the whole block over as one line: the opening
// keyword, comma-separated source rows, then the TABLE_END keyword
fn cmd_table_values(input: &str) -> PResult<'_, Command> {
    map(
        tuple((
            kw(POP_COMMANDS, "TABLE_VALUES"),
            opt(ws(char(','))),
            separated_list1(ws(char(',')), many1(ws(numeric))),
            kw(POP_COMMANDS, "TABLE_END"),
        )),
        |(_, _, rows, _)| Command::TableValues { rows },
    )(input)
}

fn cmd_set_ref_state(input: &str) -> PResult<'_, Command> {
    map(
        tuple((
            kw(POP_COMMANDS, "SET_REFERENCE_STATE"),
            ws(symbol_name),
            ws(symbol_name),
            many0(ws(char(','))),
        )),
        |(_, component, phase, _)| Command::SetReferenceState {
            component: component.to_string(),
            phase: phase.to_string(),
        },
    )(input)
}

fn cmd_set_condition(input: &str) -> PResult<'_, Command> {
    map(
        preceded(
            kw(POP_COMMANDS, "SET_CONDITION"),
            many1(terminated(ws(condition), opt(ws(char(','))))),
        ),
        Command::SetCondition,
    )(input)
}

fn cmd_label(input: &str) -> PResult<'_, Command> {
    map(
        preceded(
            kw(POP_COMMANDS, "LABEL_DATA"),
            many1(ws(take_while1(|c: char| c.is_ascii_alphanumeric()))),
        ),
        |words| Command::LabelData(words.into_iter().map(str::to_string).collect()),
    )(input)
}

fn cmd_experiment(input: &str) -> PResult<'_, Command> {
    map(
        preceded(
            kw(POP_COMMANDS, "EXPERIMENT"),
            many1(terminated(ws(experiment_item), opt(ws(char(','))))),
        ),
        Command::Experiment,
    )(input)
}

fn cmd_start_value(input: &str) -> PResult<'_, Command> {
    map(
        preceded(kw(POP_COMMANDS, "SET_START_VALUE"), ws(property_clause)),
        |(property, relation, value)| Command::SetStartValue {
            property,
            relation,
            value,
        },
    )(input)
}

fn cmd_save(input: &str) -> PResult<'_, Command> {
    value(Command::SaveWorkspace, kw(POP_COMMANDS, "SAVE_WORKSPACE"))(input)
}

/// Catalog commands with no payload shape: recognized, then the rest of the
/// line is discarded. Tried last so it can never shadow a real rule.
fn cmd_passthrough(input: &str) -> PResult<'_, Command> {
    let (after_kw, resolved) = resolve_keyword(POP_COMMANDS, input)?;
    let command = match resolved {
        "DEFINE_COMPONENTS" => Command::DefineComponents,
        "ADVANCED_OPTIONS" => Command::Passthrough(PassthroughKind::AdvancedOptions),
        "COMMENT" => Command::Passthrough(PassthroughKind::Comment),
        "EVALUATE_FUNCTIONS" => Command::Passthrough(PassthroughKind::EvaluateFunctions),
        "EXPORT" => Command::Passthrough(PassthroughKind::Export),
        "FLUSH_BUFFER" => Command::Passthrough(PassthroughKind::FlushBuffer),
        "IMPORT" => Command::Passthrough(PassthroughKind::Import),
        "SET_ALL_START_VALUES" => Command::Passthrough(PassthroughKind::SetAllStartValues),
        "SET_ALTERNATE_CONDITION" => Command::Passthrough(PassthroughKind::SetAlternateCondition),
        "SET_NUMERICAL_LIMITS" => Command::Passthrough(PassthroughKind::SetNumericalLimits),
        "SET_WEIGHT" => Command::Passthrough(PassthroughKind::SetWeight),
        _ => return Err(backtrack(input)),
    };
    let (after_kw, _) = rest(after_kw)?;
    Ok((after_kw, command))
}

/// Parse one logical command line. A trailing comma is tolerated; trailing
/// text the rules did not consume is left for the caller to reject.
pub fn command(input: &str) -> PResult<'_, Command> {
    terminated(
        alt((
            cmd_equilibrium,
            cmd_change_status,
            cmd_enter_symbol,
            cmd_table_head,
            cmd_table_values,
            cmd_set_ref_state,
            cmd_set_condition,
            cmd_label,
            cmd_experiment,
            cmd_start_value,
            cmd_save,
            cmd_passthrough,
        )),
        pair(opt(ws(char(','))), space0),
    )(input)
}
