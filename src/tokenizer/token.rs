use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    combinator::recognize,
    error::{context, VerboseError},
    sequence::pair,
    IResult,
};
use thiserror::Error;

use super::{
    keyword::Keyword,
    literal::{parse_literal, Literal},
    symbol::{parse_delimiter, parse_operator, Delimiter, Operator},
    whitespace::parse_whitespace,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Identifier(String),
    Operator(Operator),
    Delimiter(Delimiter),
    Literal(Literal),
    Whitespace(String),
}

impl Token {
    /// Tokens the parser never sees.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Keyword(keyword) => write!(f, "{}", keyword),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Operator(operator) => write!(f, "{}", operator),
            Token::Delimiter(delimiter) => write!(f, "{}", delimiter),
            Token::Literal(literal) => write!(f, "{}", literal),
            Token::Whitespace(ws) => write!(f, "{}", ws),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    current_position: usize,
    current_line: usize,
    current_column: usize,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            current_position: 0,
            current_line: 1,
            current_column: 1,
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<TokenSpan>> {
        let mut tokens = Vec::new();
        let mut remaining = input;

        while !remaining.is_empty() {
            let start_position = self.current_position;
            let start_line = self.current_line;
            let start_column = self.current_column;

            let result = alt((
                parse_whitespace,
                parse_literal,
                parse_operator,
                parse_delimiter,
                parse_identifier,
            ))(remaining);

            match result {
                Ok((new_remaining, token)) => {
                    let consumed = &remaining[..(remaining.len() - new_remaining.len())];
                    self.update_position(consumed);

                    tokens.push(TokenSpan {
                        token,
                        start: start_position,
                        end: self.current_position,
                        line: start_line,
                        column: start_column,
                    });

                    remaining = new_remaining;
                }
                Err(_) if oversized_integer(remaining).is_some() => {
                    let literal = oversized_integer(remaining).unwrap_or_default();
                    let error = TokenizerError::IntegerOutOfRange {
                        literal: literal.to_string(),
                        span: Span {
                            start: self.current_position,
                            end: self.current_position + literal.len(),
                            line: self.current_line,
                            column: self.current_column,
                        },
                    };
                    tracing::debug!("{}", error);
                    return Err(error);
                }
                Err(e) => {
                    let found = remaining.chars().take(20).collect::<String>();
                    let span = Span {
                        start: self.current_position,
                        end: self.current_position + 1,
                        line: self.current_line,
                        column: self.current_column,
                    };
                    let error = match e {
                        nom::Err::Incomplete(needed) => TokenizerError::ParseError {
                            message: format!("incomplete input, {:?}", needed),
                            found,
                            span,
                        },
                        nom::Err::Error(e) | nom::Err::Failure(e) => TokenizerError::ParseError {
                            message: nom::error::convert_error(remaining, e),
                            found,
                            span,
                        },
                    };
                    tracing::debug!("{}", error);
                    return Err(error);
                }
            }
        }

        Ok(tokens)
    }

    fn update_position(&mut self, text: &str) {
        for c in text.chars() {
            self.current_position += c.len_utf8();
            if c == '\n' {
                self.current_line += 1;
                self.current_column = 1;
            } else {
                self.current_column += 1;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl TokenSpan {
    pub fn span(&self) -> Span {
        Span {
            start: self.start,
            end: self.end,
            line: self.line,
            column: self.column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Identifiers may carry `$` so that nested type names such as `Outer$Inner` stay one token.
#[tracing::instrument(level = "trace", skip(input))]
fn parse_identifier(input: &str) -> ParserResult<Token> {
    let (input, id) = context(
        "identifier",
        recognize(pair(
            take_while1(|c: char| c.is_alphabetic() || c == '_' || c == '$'),
            take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
        )),
    )(input)?;

    if let Ok(keyword) = id.parse::<Keyword>() {
        return Ok((input, Token::Keyword(keyword)));
    }

    Ok((input, Token::Identifier(id.to_string())))
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("unexpected input {found:?} at {span}: {message}")]
    ParseError {
        message: String,
        found: String,
        span: Span,
    },
    #[error("integer literal {literal} at {span} does not fit in 64 bits")]
    IntegerOutOfRange { literal: String, span: Span },
}

impl TokenizerError {
    pub fn span(&self) -> &Span {
        match self {
            TokenizerError::ParseError { span, .. } | TokenizerError::IntegerOutOfRange { span, .. } => {
                span
            }
        }
    }
}

/// Leading run of digits that overflows `i64`. Negative literals are a unary minus applied to the
/// magnitude, so `i64::MIN` cannot be written either.
fn oversized_integer(input: &str) -> Option<&str> {
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let digits = &input[..end];
    (!digits.is_empty() && digits.parse::<i64>().is_err()).then_some(digits)
}
