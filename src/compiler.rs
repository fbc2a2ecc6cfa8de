//! # Expression Compiler
//!
//! The seam between an [`AccessorDescriptor`](crate::accessor::AccessorDescriptor) and whatever
//! turns expression text into something executable. The descriptor only sees the
//! [`ExpressionCompiler`] and [`CompiledExpression`] traits; [`DefaultExpressionCompiler`] is the
//! built-in implementation:
//!
//! ```text
//! source ─▶ tokenizer ─▶ analyzer ─▶ type checker ─▶ lowering ─▶ CompiledExpression
//! ```

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::trace;

use crate::analyzer::{parse_tokens, ParseError};
use crate::config::{CompilerOptions, ParserConfiguration};
use crate::context::TypeResolver;
use crate::eval::{lower, CompiledNode, EvalError, EvalResult};
use crate::tokenizer::token::{Tokenizer, TokenizerError};
use crate::type_checker::{TypeCheckError, TypeChecker};
use crate::types::TypeHandle;
use crate::value::Value;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("tokenizer error: {0}")]
    Tokenize(#[from] TokenizerError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("type error: {0}")]
    TypeCheck(#[from] TypeCheckError),
}

/// Everything visible to one compilation: the single input binding, type lookup, imports and
/// the feature toggles.
#[derive(Clone)]
pub struct CompileScope {
    input_name: String,
    input_type: TypeHandle,
    resolver: Arc<dyn TypeResolver>,
    parser_config: Arc<ParserConfiguration>,
    options: CompilerOptions,
}

impl CompileScope {
    pub fn new(
        input_name: impl Into<String>,
        input_type: TypeHandle,
        resolver: Arc<dyn TypeResolver>,
        parser_config: Arc<ParserConfiguration>,
        options: CompilerOptions,
    ) -> Self {
        Self {
            input_name: input_name.into(),
            input_type,
            resolver,
            parser_config,
            options,
        }
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn input_type(&self) -> &TypeHandle {
        &self.input_type
    }

    pub fn resolver(&self) -> &Arc<dyn TypeResolver> {
        &self.resolver
    }

    pub fn parser_config(&self) -> &ParserConfiguration {
        &self.parser_config
    }

    pub fn options(&self) -> CompilerOptions {
        self.options
    }
}

impl fmt::Debug for CompileScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileScope")
            .field("input_name", &self.input_name)
            .field("input_type", &self.input_type)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// An executable artifact. Immutable once built and shared freely across threads.
#[mockall::automock]
pub trait CompiledExpression: Send + Sync {
    /// Statically inferred type of [`execute`](CompiledExpression::execute)'s result.
    fn result_type(&self) -> TypeHandle;

    fn execute(&self, instance: &Value) -> EvalResult<Value>;
}

#[mockall::automock]
pub trait ExpressionCompiler: Send + Sync {
    fn compile(
        &self,
        source: &str,
        scope: &CompileScope,
    ) -> Result<Arc<dyn CompiledExpression>, ExpressionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExpressionCompiler;

impl DefaultExpressionCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionCompiler for DefaultExpressionCompiler {
    #[tracing::instrument(level = "debug", skip(self, scope), fields(input_type = %scope.input_type()))]
    fn compile(
        &self,
        source: &str,
        scope: &CompileScope,
    ) -> Result<Arc<dyn CompiledExpression>, ExpressionError> {
        let tokens = Tokenizer::new().tokenize(source)?;
        let expr = parse_tokens(&tokens)?;
        let typed = TypeChecker::new(scope).check(&expr)?;
        trace!(
            "checked `{}`: {} (dynamic: {})",
            source,
            typed.ty,
            typed.is_dynamic()
        );

        let result_type = typed.ty.clone();
        let root = lower(typed, Arc::clone(scope.resolver()));
        Ok(Arc::new(LoweredExpression {
            input_type: scope.input_type().clone(),
            result_type,
            root,
        }))
    }
}

struct LoweredExpression {
    input_type: TypeHandle,
    result_type: TypeHandle,
    root: CompiledNode,
}

impl CompiledExpression for LoweredExpression {
    fn result_type(&self) -> TypeHandle {
        self.result_type.clone()
    }

    /// Rejects instances that are `null` or not of the input type before running.
    fn execute(&self, instance: &Value) -> EvalResult<Value> {
        if instance.is_null() || !instance.conforms_to(&self.input_type) {
            return Err(EvalError::type_mismatch(
                &self.input_type,
                instance.type_handle(),
            ));
        }
        (self.root)(instance)
    }
}
