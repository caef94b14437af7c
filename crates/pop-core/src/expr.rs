//! Expression builder — from grammar tokens to algebraic trees
//!
//! The grammar hands over a flat token run; this module renders it to
//! canonical expression text and parses that through [`crate::algebra`].
//! The rendering collapses POP-specific notation into plain symbols:
//!
//! - `.` (derivative) becomes a `D_`-prefixed symbol factor: `H.T` reads
//!   as `H*D_T`
//! - `@n` column references become `COL_n`
//! - property references flatten to underscore-joined symbols,
//!   `HM(LIQUID)` to `HM_LIQUID`, with `*` as `ALL`

use crate::algebra::{self, Expr};
use crate::parser::ast::{ExprToken, PhaseList, PropertyRef, ValueToken};
use crate::Result;

/// Build an expression tree from an ENTER_SYMBOL token run.
///
/// # Errors
/// Returns [`crate::Error::Expression`] when the tokens do not form a
/// well-formed expression.
pub fn build(tokens: &[ExprToken]) -> Result<Expr> {
    algebra::parse(&render(tokens))
}

/// Lift a single right-hand-side value into an expression. Labels take
/// the same `COL_n` spelling the token renderer uses.
pub fn from_value(value: &ValueToken) -> Expr {
    match value {
        ValueToken::Float(v) => Expr::Num(*v),
        ValueToken::Int(i) => Expr::Num(*i as f64),
        ValueToken::Label(n) => Expr::Sym(format!("COL_{n}")),
        ValueToken::Symbol(name) => Expr::Sym(name.clone()),
    }
}

fn render(tokens: &[ExprToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            ExprToken::Num(v) => out.push_str(&v.to_string()),
            ExprToken::Int(i) => out.push_str(&i.to_string()),
            ExprToken::Ident(name) => out.push_str(name),
            ExprToken::Op(op) => out.push(*op),
            ExprToken::LParen => out.push('('),
            ExprToken::RParen => out.push(')'),
            ExprToken::Deriv => out.push_str("*D_"),
            ExprToken::ColumnRef(n) => {
                out.push_str("COL_");
                out.push_str(&n.to_string());
            }
            ExprToken::Property(p) => out.push_str(&property_symbol(p)),
        }
    }
    out
}

/// Flatten a property reference to a single symbol name
fn property_symbol(p: &PropertyRef) -> String {
    let mut name = p.property.clone();
    match &p.phases {
        PhaseList::All => name.push_str("_ALL"),
        PhaseList::Named(phases) => {
            for phase in phases {
                name.push('_');
                name.push_str(phase);
            }
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::ExprToken as T;

    #[test]
    fn test_build_linear_function() {
        // GHSERCR+24000-10*T
        let tokens = [
            T::Ident("GHSERCR".to_string()),
            T::Op('+'),
            T::Int(24000),
            T::Op('-'),
            T::Int(10),
            T::Op('*'),
            T::Ident("T".to_string()),
        ];
        let expr = build(&tokens).unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                '-',
                Expr::binary('+', Expr::sym("GHSERCR"), Expr::Num(24000.0)),
                Expr::binary('*', Expr::Num(10.0), Expr::sym("T")),
            )
        );
    }

    #[test]
    fn test_derivative_marker() {
        // H.T reads as H*D_T
        let tokens = [T::Ident("H".to_string()), T::Deriv, T::Ident("T".to_string())];
        assert_eq!(
            build(&tokens).unwrap(),
            Expr::binary('*', Expr::sym("H"), Expr::sym("D_T")),
        );
    }

    #[test]
    fn test_column_reference() {
        let tokens = [T::ColumnRef(2), T::Op('*'), T::Num(0.5)];
        assert_eq!(
            build(&tokens).unwrap(),
            Expr::binary('*', Expr::sym("COL_2"), Expr::Num(0.5)),
        );
    }

    #[test]
    fn test_property_flattening() {
        use crate::parser::ast::{PhaseList, PropertyRef};
        let tokens = [
            T::Property(PropertyRef {
                property: "HM".to_string(),
                phases: PhaseList::Named(vec!["LIQUID".to_string()]),
            }),
            T::Op('-'),
            T::Property(PropertyRef {
                property: "ACR".to_string(),
                phases: PhaseList::All,
            }),
        ];
        assert_eq!(
            build(&tokens).unwrap(),
            Expr::binary('-', Expr::sym("HM_LIQUID"), Expr::sym("ACR_ALL")),
        );
    }

    #[test]
    fn test_unbalanced_tokens_fail() {
        let tokens = [T::LParen, T::Ident("T".to_string())];
        assert!(build(&tokens).is_err());
    }
}
