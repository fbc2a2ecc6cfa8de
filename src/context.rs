//! # Compilation Context
//!
//! Everything a descriptor needs from its environment at compile time, supplied per call:
//!
//! * [`TypeResolver`]: turns type names into [`TypeHandle`]s and hands out member layouts
//! * [`ExpressionCompiler`]: turns expression text into an executable artifact
//! * [`ValueKindClassifier`]: classifies the artifact's static result type
//! * [`ParserConfiguration`]: imports visible to the expression
//!
//! Nothing here is global, so independently configured contexts can compile side by side.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use crate::compiler::{CompileScope, DefaultExpressionCompiler, ExpressionCompiler};
use crate::config::{CompilerOptions, ParserConfiguration, TypeDefinition};
use crate::types::{TypeDef, TypeHandle};
use crate::value_kind::{DefaultValueKindClassifier, ValueKindClassifier};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("type '{name}' could not be found")]
pub struct TypeNotFoundError {
    pub name: String,
}

impl TypeNotFoundError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Resolves type names for the compiler.
#[mockall::automock]
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError>;

    /// Member layout of an object type, if known.
    fn definition(&self, name: &str) -> Option<Arc<TypeDef>>;
}

/// Concurrent in-memory [`TypeResolver`]. Built-in type names always resolve.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<String, Arc<TypeDef>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = TypeDefinition>) -> Self {
        let registry = Self::new();
        for definition in definitions {
            registry.register(definition.into());
        }
        registry
    }

    /// Registers (or replaces) an object type.
    pub fn register(&self, definition: TypeDef) {
        debug!("registering type {}", definition.name());
        self.types
            .insert(definition.name().to_string(), Arc::new(definition));
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<TypeDef>> {
        self.types.remove(name).map(|(_, definition)| definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        if let Some(builtin) = TypeHandle::builtin(name) {
            return Ok(builtin);
        }
        if self.types.contains_key(name) {
            return Ok(TypeHandle::object(name));
        }
        Err(TypeNotFoundError::new(name))
    }

    fn definition(&self, name: &str) -> Option<Arc<TypeDef>> {
        self.types.get(name).map(|entry| Arc::clone(entry.value()))
    }
}

/// The per-call environment handed to
/// [`AccessorDescriptor::compile`](crate::accessor::AccessorDescriptor::compile).
#[derive(Clone)]
pub struct CompilationContext {
    resolver: Arc<dyn TypeResolver>,
    compiler: Arc<dyn ExpressionCompiler>,
    classifier: Arc<dyn ValueKindClassifier>,
    parser_config: Arc<ParserConfiguration>,
}

impl CompilationContext {
    /// A context using the default compiler and classifier.
    pub fn new(resolver: Arc<dyn TypeResolver>) -> Self {
        Self {
            resolver,
            compiler: Arc::new(DefaultExpressionCompiler::new()),
            classifier: Arc::new(DefaultValueKindClassifier),
            parser_config: Arc::new(ParserConfiguration::default()),
        }
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn ExpressionCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ValueKindClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_parser_config(mut self, parser_config: ParserConfiguration) -> Self {
        self.parser_config = Arc::new(parser_config);
        self
    }

    pub fn resolver(&self) -> &Arc<dyn TypeResolver> {
        &self.resolver
    }

    pub fn compiler(&self) -> &dyn ExpressionCompiler {
        self.compiler.as_ref()
    }

    pub fn classifier(&self) -> &dyn ValueKindClassifier {
        self.classifier.as_ref()
    }

    pub fn parser_config(&self) -> &ParserConfiguration {
        &self.parser_config
    }

    /// Resolves a type name, trying imports first.
    pub fn resolve_type(&self, name: &str) -> Result<TypeHandle, TypeNotFoundError> {
        let qualified = self.parser_config.qualify(name);
        self.resolver
            .resolve(&qualified)
            .map_err(|_| TypeNotFoundError::new(name))
    }

    /// Builds the scope for one compilation: a single input binding typed `input_type`.
    pub fn scope(
        &self,
        input_name: &str,
        input_type: TypeHandle,
        options: CompilerOptions,
    ) -> CompileScope {
        CompileScope::new(
            input_name,
            input_type,
            Arc::clone(&self.resolver),
            Arc::clone(&self.parser_config),
            options,
        )
    }
}

impl std::fmt::Debug for CompilationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationContext")
            .field("parser_config", &self.parser_config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_builtins_and_objects() {
        let registry = TypeRegistry::new();
        registry.register(TypeDef::new("com.acme.Person").with_field("name", TypeHandle::Text));

        assert_eq!(registry.resolve("String"), Ok(TypeHandle::Text));
        assert_eq!(
            registry.resolve("com.acme.Person"),
            Ok(TypeHandle::object("com.acme.Person"))
        );
        assert_eq!(
            registry.resolve("com.none.NoSuchType"),
            Err(TypeNotFoundError::new("com.none.NoSuchType"))
        );
        assert!(registry.definition("com.acme.Person").is_some());
        assert!(registry.definition("String").is_none());
    }

    #[test]
    fn test_unregister() {
        let registry = TypeRegistry::new();
        registry.register(TypeDef::new("a.B"));
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister("a.B").is_some());
        assert!(registry.is_empty());
        assert!(registry.resolve("a.B").is_err());
    }

    #[test]
    fn test_context_resolves_through_imports() {
        let registry = Arc::new(TypeRegistry::new());
        registry.register(TypeDef::new("com.acme.Person"));
        let mut config = ParserConfiguration::default();
        config.add_import("com.acme.Person");
        let context = CompilationContext::new(registry).with_parser_config(config);

        assert_eq!(
            context.resolve_type("Person"),
            Ok(TypeHandle::object("com.acme.Person"))
        );
        assert_eq!(
            context.resolve_type("Pet"),
            Err(TypeNotFoundError::new("Pet"))
        );
    }
}
