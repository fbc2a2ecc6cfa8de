use nom::{bytes::complete::take_while1, combinator::map, error::context};

use super::token::{ParserResult, Token};

/// Parses a run of blanks (spaces, tabs and line breaks).
///
/// ```
/// # use field_accessor::tokenizer::whitespace::parse_whitespace;
/// # use field_accessor::tokenizer::token::Token;
/// let (rest, token) = parse_whitespace(" \n\tage").unwrap();
/// assert_eq!(token, Token::Whitespace(" \n\t".to_string()));
/// assert_eq!(rest, "age");
/// ```
#[tracing::instrument(level = "trace", skip(input))]
pub fn parse_whitespace(input: &str) -> ParserResult<Token> {
    context(
        "whitespace expected",
        map(take_while1(char::is_whitespace), |ws: &str| {
            Token::Whitespace(ws.to_string())
        }),
    )(input)
}
