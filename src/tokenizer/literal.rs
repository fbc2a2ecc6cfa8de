use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{char, digit1},
    combinator::{map, map_res, opt, recognize, value},
    error::context,
    sequence::{delimited, tuple},
};

use super::token::{ParserResult, Token};

/// Numeric and text literals. Signs are unary operators, `true`, `false` and `null` are
/// keywords.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Text(s) => write!(f, "{:?}", s),
        }
    }
}

fn escape_sequence(input: &str) -> ParserResult<&str> {
    alt((
        value("\\", tag("\\")),
        value("\"", tag("\"")),
        value("'", tag("'")),
        value("\n", tag("n")),
        value("\t", tag("t")),
        value("\r", tag("r")),
    ))(input)
}

#[tracing::instrument(level = "trace", skip(input))]
fn parse_double_quoted(input: &str) -> ParserResult<String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(is_not("\\\""), '\\', escape_sequence)),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

#[tracing::instrument(level = "trace", skip(input))]
fn parse_single_quoted(input: &str) -> ParserResult<String> {
    delimited(
        char('\''),
        map(
            opt(escaped_transform(is_not("\\'"), '\\', escape_sequence)),
            Option::unwrap_or_default,
        ),
        char('\''),
    )(input)
}

#[tracing::instrument(level = "trace", skip(input))]
fn parse_text_literal(input: &str) -> ParserResult<Literal> {
    context(
        "text literal",
        map(alt((parse_double_quoted, parse_single_quoted)), Literal::Text),
    )(input)
}

#[tracing::instrument(level = "trace", skip(input))]
fn parse_float_literal(input: &str) -> ParserResult<Literal> {
    context(
        "float literal",
        map_res(recognize(tuple((digit1, char('.'), digit1))), |s: &str| {
            s.parse::<f64>().map(Literal::Float)
        }),
    )(input)
}

#[tracing::instrument(level = "trace", skip(input))]
fn parse_integer_literal(input: &str) -> ParserResult<Literal> {
    context(
        "integer literal",
        map_res(digit1, |s: &str| s.parse::<i64>().map(Literal::Integer)),
    )(input)
}

#[tracing::instrument(level = "trace", skip(input))]
pub fn parse_literal(input: &str) -> ParserResult<Token> {
    context(
        "literal",
        map(
            alt((
                parse_text_literal,
                parse_float_literal,
                parse_integer_literal,
            )),
            Token::Literal,
        ),
    )(input)
}
