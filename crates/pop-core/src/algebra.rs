//! Algebraic expression trees for symbol definitions
//!
//! ENTER_SYMBOL functions and variables carry arithmetic over symbols,
//! numbers, and derivatives. The expression builder renders its token run
//! to flat text and this module parses that text into a tree with the
//! usual precedence: `^` binds tightest (right associative), then `*`/`/`,
//! then `+`/`-`, all left associative; unary minus sits above `^`.

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, digit0, digit1, one_of, space0};
use nom::combinator::{map, map_res, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An algebraic expression over numbers and named symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Num(f64),
    Sym(String),
    Unary {
        op: char,
        operand: Box<Expr>,
    },
    Binary {
        op: char,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: char, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn sym(name: &str) -> Expr {
        Expr::Sym(name.to_string())
    }
}

/// Parse an expression, requiring the whole input to be consumed.
///
/// # Errors
/// Returns [`Error::Expression`] when the text is not a well-formed
/// expression.
pub fn parse(input: &str) -> Result<Expr> {
    match expression(input) {
        Ok((rest, expr)) if rest.trim().is_empty() => Ok(expr),
        _ => Err(Error::Expression(input.to_string())),
    }
}

type AResult<'a, T> = IResult<&'a str, T>;

// ── Grammar ────────────────────────────────────────────────

fn expression(input: &str) -> AResult<'_, Expr> {
    let (input, first) = term(input)?;
    let (input, ops) = many0(pair(spaced(one_of("+-")), term))(input)?;
    Ok((input, fold_left(first, ops)))
}

fn term(input: &str) -> AResult<'_, Expr> {
    let (input, first) = power(input)?;
    let (input, ops) = many0(pair(spaced(one_of("*/")), power))(input)?;
    Ok((input, fold_left(first, ops)))
}

// Right associative: a^b^c groups as a^(b^c)
fn power(input: &str) -> AResult<'_, Expr> {
    let (input, base) = unary(input)?;
    let (input, exp) = opt(preceded(spaced(char('^')), power))(input)?;
    Ok((
        input,
        match exp {
            Some(exp) => Expr::binary('^', base, exp),
            None => base,
        },
    ))
}

fn unary(input: &str) -> AResult<'_, Expr> {
    alt((
        map(preceded(spaced(char('-')), unary), |operand| Expr::Unary {
            op: '-',
            operand: Box::new(operand),
        }),
        atom,
    ))(input)
}

fn atom(input: &str) -> AResult<'_, Expr> {
    spaced(alt((
        map(number, Expr::Num),
        map(identifier, |s: &str| Expr::Sym(s.to_string())),
        delimited(char('('), expression, char(')')),
    )))(input)
}

fn fold_left(first: Expr, ops: Vec<(char, Expr)>) -> Expr {
    ops.into_iter()
        .fold(first, |lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
}

// ── Lexical ────────────────────────────────────────────────

fn spaced<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> AResult<'a, O>
where
    F: FnMut(&'a str) -> AResult<'a, O>,
{
    delimited(space0, inner, space0)
}

fn identifier(input: &str) -> AResult<'_, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == ':')(input)
}

fn exponent_part(input: &str) -> AResult<'_, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

// Unsigned; the sign lives in the unary rule
fn number(input: &str) -> AResult<'_, f64> {
    map_res(
        alt((
            recognize(tuple((
                digit1,
                opt(pair(char('.'), digit0)),
                opt(exponent_part),
            ))),
            recognize(tuple((char('.'), digit1, opt(exponent_part)))),
        )),
        str::parse::<f64>,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_atom() {
        assert_eq!(parse("24000").unwrap(), Expr::Num(24000.0));
        assert_eq!(parse("2.5e-3").unwrap(), Expr::Num(0.0025));
    }

    #[test]
    fn test_symbol_atom() {
        assert_eq!(parse("GHSERCR").unwrap(), Expr::sym("GHSERCR"));
        assert_eq!(parse("COL_2").unwrap(), Expr::sym("COL_2"));
    }

    #[test]
    fn test_precedence_mul_over_add() {
        assert_eq!(
            parse("A+B*C").unwrap(),
            Expr::binary('+', Expr::sym("A"), Expr::binary('*', Expr::sym("B"), Expr::sym("C")))
        );
    }

    #[test]
    fn test_left_associative_subtraction() {
        // A-B-C is (A-B)-C
        assert_eq!(
            parse("A-B-C").unwrap(),
            Expr::binary('-', Expr::binary('-', Expr::sym("A"), Expr::sym("B")), Expr::sym("C"))
        );
    }

    #[test]
    fn test_power_right_associative() {
        assert_eq!(
            parse("T^2^3").unwrap(),
            Expr::binary('^', Expr::sym("T"), Expr::binary('^', Expr::Num(2.0), Expr::Num(3.0)))
        );
    }

    #[test]
    fn test_parentheses_override() {
        assert_eq!(
            parse("(A+B)*C").unwrap(),
            Expr::binary('*', Expr::binary('+', Expr::sym("A"), Expr::sym("B")), Expr::sym("C"))
        );
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(
            parse("-10*T").unwrap(),
            Expr::binary(
                '*',
                Expr::Unary { op: '-', operand: Box::new(Expr::Num(10.0)) },
                Expr::sym("T"),
            )
        );
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(parse(" A + 2 ").unwrap(), parse("A+2").unwrap());
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(matches!(parse("A+2)"), Err(Error::Expression(_))));
        assert!(matches!(parse(""), Err(Error::Expression(_))));
        assert!(matches!(parse("A+"), Err(Error::Expression(_))));
    }
}
