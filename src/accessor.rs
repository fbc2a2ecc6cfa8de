//! # Accessor Descriptor
//!
//! An [`AccessorDescriptor`] names a target type and an expression over an instance of that
//! type. It is created uncompiled, compiled once against a [`CompilationContext`] and then
//! evaluated any number of times, from any number of threads.
//!
//! Only the three source fields are persisted. A descriptor read back from bytes or serde is
//! uncompiled and has to be compiled again by its owner.

use std::{
    fmt,
    hash::{Hash, Hasher},
    io::{Read, Write},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::compiler::{CompiledExpression, ExpressionError};
use crate::config::CompilerOptions;
use crate::context::CompilationContext;
use crate::eval::{EvalError, EvalResult};
use crate::types::TypeHandle;
use crate::value::Value;
use crate::value_kind::ValueKind;

/// Name the input instance is bound to inside the expression.
pub const INPUT_NAME: &str = "this";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("type '{name}' could not be resolved")]
    TypeNotFound { name: String },
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("text of {0} bytes exceeds the 65535 byte limit")]
    TextTooLong(usize),
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBoolean(u8),
    #[error("text is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Clone, Default)]
enum CompiledState {
    #[default]
    Uncompiled,
    Compiled {
        artifact: Arc<dyn CompiledExpression>,
        result_kind: ValueKind,
        result_type: TypeHandle,
    },
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AccessorDescriptor {
    type_name: String,
    expression_text: String,
    strict_typing: bool,
    #[serde(skip)]
    state: CompiledState,
}

impl AccessorDescriptor {
    pub fn new(
        type_name: impl Into<String>,
        expression_text: impl Into<String>,
        strict_typing: bool,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            expression_text: expression_text.into(),
            strict_typing,
            state: CompiledState::Uncompiled,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn expression_text(&self) -> &str {
        &self.expression_text
    }

    pub fn strict_typing(&self) -> bool {
        self.strict_typing
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.state, CompiledState::Compiled { .. })
    }

    /// Kind of the compiled expression's result, once compiled.
    pub fn result_kind(&self) -> Option<ValueKind> {
        match &self.state {
            CompiledState::Compiled { result_kind, .. } => Some(*result_kind),
            CompiledState::Uncompiled => None,
        }
    }

    pub fn result_type(&self) -> Option<&TypeHandle> {
        match &self.state {
            CompiledState::Compiled { result_type, .. } => Some(result_type),
            CompiledState::Uncompiled => None,
        }
    }

    /// Drops the compiled artifact.
    pub fn reset(&mut self) {
        self.state = CompiledState::Uncompiled;
    }

    /// Resolves the target type through `context`, compiles the expression against it and
    /// stores the artifact with its classified result type.
    ///
    /// Compiling again replaces the previous artifact. On failure the descriptor is left
    /// uncompiled, whatever state it was in before.
    #[tracing::instrument(
        level = "debug",
        skip(self, context),
        fields(type_name = %self.type_name, expression = %self.expression_text)
    )]
    pub fn compile(&mut self, context: &CompilationContext) -> Result<(), CompileError> {
        self.state = CompiledState::Uncompiled;

        let input_type = context.resolve_type(&self.type_name).map_err(|e| {
            warn!("Failed to resolve accessor type: {}", e);
            CompileError::TypeNotFound {
                name: self.type_name.clone(),
            }
        })?;

        let options = CompilerOptions::for_accessor(self.strict_typing);
        let scope = context.scope(INPUT_NAME, input_type, options);
        let artifact = context
            .compiler()
            .compile(&self.expression_text, &scope)
            .map_err(|e| {
                warn!("Failed to compile accessor expression: {}", e);
                CompileError::Expression(e)
            })?;

        let result_type = artifact.result_type();
        let result_kind = context.classifier().classify(&result_type);
        debug!(
            "Compiled accessor on {}: `{}` -> {} ({})",
            self.type_name, self.expression_text, result_type, result_kind
        );
        self.state = CompiledState::Compiled {
            artifact,
            result_kind,
            result_type,
        };
        Ok(())
    }

    /// Runs the compiled expression against `instance`.
    pub fn evaluate(&self, instance: &Value) -> EvalResult<Value> {
        match &self.state {
            CompiledState::Compiled { artifact, .. } => artifact.execute(instance),
            CompiledState::Uncompiled => Err(EvalError::NotCompiled),
        }
    }

    /// Writes the type name, the expression and the strictness flag, in that order.
    pub fn write_external<W: Write>(&self, writer: &mut W) -> Result<(), PersistError> {
        write_text(writer, &self.type_name)?;
        write_text(writer, &self.expression_text)?;
        writer.write_all(&[u8::from(self.strict_typing)])?;
        Ok(())
    }

    pub fn read_external<R: Read>(reader: &mut R) -> Result<Self, PersistError> {
        let type_name = read_text(reader)?;
        let expression_text = read_text(reader)?;
        let strict_typing = read_boolean(reader)?;
        Ok(Self::new(type_name, expression_text, strict_typing))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        let mut bytes = Vec::with_capacity(self.type_name.len() + self.expression_text.len() + 5);
        self.write_external(&mut bytes)?;
        Ok(bytes)
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, PersistError> {
        Self::read_external(&mut bytes)
    }
}

fn write_text<W: Write>(writer: &mut W, text: &str) -> Result<(), PersistError> {
    let len = u16::try_from(text.len()).map_err(|_| PersistError::TextTooLong(text.len()))?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

fn read_text<R: Read>(reader: &mut R) -> Result<String, PersistError> {
    let mut len = [0u8; 2];
    reader.read_exact(&mut len)?;
    let mut bytes = vec![0u8; usize::from(u16::from_be_bytes(len))];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| PersistError::InvalidUtf8)
}

fn read_boolean<R: Read>(reader: &mut R) -> Result<bool, PersistError> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    match byte[0] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(PersistError::InvalidBoolean(other)),
    }
}

impl PartialEq for AccessorDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.expression_text == other.expression_text
            && self.strict_typing == other.strict_typing
    }
}

impl Eq for AccessorDescriptor {}

impl Hash for AccessorDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name.hash(state);
        self.expression_text.hash(state);
        self.strict_typing.hash(state);
    }
}

impl fmt::Display for AccessorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[AccessorDescriptor type_name={}, expression={}, strict_typing={}]",
            self.type_name, self.expression_text, self.strict_typing
        )
    }
}

impl fmt::Debug for AccessorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorDescriptor")
            .field("type_name", &self.type_name)
            .field("expression_text", &self.expression_text)
            .field("strict_typing", &self.strict_typing)
            .field("result_type", &self.result_type())
            .finish()
    }
}
