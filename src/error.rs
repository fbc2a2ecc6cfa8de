use thiserror::Error;

use crate::accessor::{CompileError, PersistError};
use crate::compiler::ExpressionError;
use crate::eval::EvalError;
use crate::types::TypeParseError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),
    #[error("Eval error: {0}")]
    Eval(#[from] EvalError),
    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("Type error: {0}")]
    TypeParse(#[from] TypeParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InternalResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
