//! # Evaluation
//!
//! Lowers a type-checked expression into a tree of `Send + Sync` closures and runs it against
//! input instances. The closure tree is built once per compilation; evaluating it never touches
//! the source text, the parser or the type checker again.

pub mod evaluator;
pub mod methods;
pub mod operators;

use thiserror::Error;

pub use evaluator::{lower, CompiledNode};
pub use methods::BuiltinMethod;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("accessor has not been compiled")]
    NotCompiled,

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("null dereference while accessing `{member}`")]
    NullDereference { member: String },

    #[error("unknown property `{property}` on {type_name}")]
    UnknownProperty { type_name: String, property: String },

    #[error("unknown method `{method}` on {type_name}")]
    UnknownMethod { type_name: String, method: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("method `{method}` failed: {message}")]
    Method { method: String, message: String },
}

impl EvalError {
    pub fn type_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn null_dereference(member: impl Into<String>) -> Self {
        Self::NullDereference {
            member: member.into(),
        }
    }

    /// Error for native methods to report their own failures.
    pub fn method(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Method {
            method: method.into(),
            message: message.into(),
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
