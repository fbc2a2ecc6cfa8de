//! # Symbol Tokens
//!
//! Operators and delimiters of the accessor language. Multi-character operators are listed
//! before their single-character prefixes so that `>=` is never read as `>` followed by `=`.

use strum_macros::{AsRefStr, Display, EnumString};

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map, value},
    error::context,
};

use super::token::{ParserResult, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Operator {
    /// Member access (`.`)
    #[strum(serialize = ".")]
    Dot,
    /// Ternary condition (`?`)
    #[strum(serialize = "?")]
    Question,

    #[strum(serialize = "==")]
    EqualEqual,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,

    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,

    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "||")]
    Or,
    #[strum(serialize = "!")]
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Delimiter {
    #[strum(serialize = "(")]
    OpenParen,
    #[strum(serialize = ")")]
    CloseParen,
    #[strum(serialize = "[")]
    OpenBracket,
    #[strum(serialize = "]")]
    CloseBracket,
    #[strum(serialize = ",")]
    Comma,
    /// Ternary branch separator (`:`)
    #[strum(serialize = ":")]
    Colon,
}

/// Parses an operator token, longest match first.
///
/// ```
/// # use field_accessor::tokenizer::symbol::{parse_operator, Operator};
/// # use field_accessor::tokenizer::token::Token;
/// let (rest, token) = parse_operator(">= 18").unwrap();
/// assert_eq!(token, Token::Operator(Operator::GreaterEqual));
/// assert_eq!(rest, " 18");
/// ```
#[tracing::instrument(level = "trace", skip(input))]
pub fn parse_operator(input: &str) -> ParserResult<Token> {
    context(
        "operator",
        map(
            alt((
                value(Operator::EqualEqual, tag("==")),
                value(Operator::NotEqual, tag("!=")),
                value(Operator::GreaterEqual, tag(">=")),
                value(Operator::LessEqual, tag("<=")),
                value(Operator::And, tag("&&")),
                value(Operator::Or, tag("||")),
                value(Operator::Dot, tag(".")),
                value(Operator::Question, tag("?")),
                value(Operator::Greater, tag(">")),
                value(Operator::Less, tag("<")),
                value(Operator::Plus, tag("+")),
                value(Operator::Minus, tag("-")),
                value(Operator::Multiply, tag("*")),
                value(Operator::Divide, tag("/")),
                value(Operator::Modulo, tag("%")),
                value(Operator::Not, tag("!")),
            )),
            Token::Operator,
        ),
    )(input)
}

#[tracing::instrument(level = "trace", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<Token> {
    context(
        "delimiter",
        map(
            alt((
                value(Delimiter::OpenParen, tag("(")),
                value(Delimiter::CloseParen, tag(")")),
                value(Delimiter::OpenBracket, tag("[")),
                value(Delimiter::CloseBracket, tag("]")),
                value(Delimiter::Comma, tag(",")),
                value(Delimiter::Colon, tag(":")),
            )),
            Token::Delimiter,
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators() {
        let test_cases = [
            ("==", Operator::EqualEqual),
            ("!=", Operator::NotEqual),
            (">=", Operator::GreaterEqual),
            ("<=", Operator::LessEqual),
            ("&&", Operator::And),
            ("||", Operator::Or),
            (".", Operator::Dot),
            ("?", Operator::Question),
            ("%", Operator::Modulo),
            ("!", Operator::Not),
        ];

        for (input, expected) in test_cases {
            let (rest, token) = parse_operator(input).unwrap();
            assert_eq!(token, Token::Operator(expected));
            assert_eq!(rest, "");
            assert_eq!(expected.to_string(), input);
        }
    }

    #[test]
    fn test_delimiters() {
        for input in ["(", ")", "[", "]", ",", ":"] {
            let (rest, token) = parse_delimiter(input).unwrap();
            assert!(matches!(token, Token::Delimiter(d) if d.to_string() == input));
            assert_eq!(rest, "");
        }
    }

    #[test]
    fn test_single_ampersand_is_rejected() {
        assert!(parse_operator("& x").is_err());
    }
}
