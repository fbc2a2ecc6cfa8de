//! # field-accessor
//!
//! Deferred-compilation field accessors: an [`AccessorDescriptor`] pairs a type name with an
//! accessor expression (`"name"`, `"address.city"`, `"age + 1"`, ...) and turns it into a
//! reusable, statically typed value extractor once a [`CompilationContext`] can resolve the type.
//!
//! ```text
//! Source → Tokenizer → Analyzer/Parser → Type Checker → Evaluator (compiled closures)
//! ```
//!
//! The accessor only talks to its collaborators through the [`TypeResolver`],
//! [`ExpressionCompiler`] and [`ValueKindClassifier`] traits. [`TypeRegistry`],
//! [`DefaultExpressionCompiler`] and [`DefaultValueKindClassifier`] are the stock implementations.

pub mod accessor;
pub mod analyzer;
pub mod ast;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod eval;
pub mod tokenizer;
pub mod type_checker;
pub mod types;
pub mod value;
pub mod value_kind;

pub use accessor::{AccessorDescriptor, CompileError, PersistError};
pub use compiler::{
    CompileScope, CompiledExpression, DefaultExpressionCompiler, ExpressionCompiler,
    ExpressionError,
};
pub use config::{CompilerConfig, CompilerOptions, ParserConfiguration, TypeDefinition};
pub use context::{CompilationContext, TypeNotFoundError, TypeRegistry, TypeResolver};
pub use error::{Error, InternalResult};
pub use eval::{EvalError, EvalResult};
pub use types::{FieldDef, MethodDef, TypeDef, TypeHandle};
pub use value::{Object, Value};
pub use value_kind::{DefaultValueKindClassifier, ValueKind, ValueKindClassifier};
