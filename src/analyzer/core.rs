use thiserror::Error;

use crate::tokenizer::token::Span;

/// A parser over a slice of `I`, starting at `pos`. On success it returns the position after the
/// consumed input together with the produced value.
pub trait Parser<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

pub type ParseResult<O> = Result<(usize, O), ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {expected}, found `{found}`")]
    Unexpected {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("unexpected end of expression")]
    EOF,
    #[error("no alternative matched")]
    NoAlternative,
    #[error("{0}")]
    Fail(String),
    #[error("{message}: {inner}")]
    WithContext {
        message: String,
        inner: Box<ParseError>,
    },
    /// Reported by [`parse_tokens`](super::parsers::parse_tokens) with a source location.
    #[error("unexpected `{found}` at {span}")]
    UnexpectedToken { found: String, span: Span },
    #[error("empty expression")]
    EmptyInput,
    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

impl ParseError {
    /// Token position the error was raised at, if known.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::Unexpected { position, .. } => Some(*position),
            ParseError::WithContext { inner, .. } => inner.position(),
            _ => None,
        }
    }
}
