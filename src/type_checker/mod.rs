//! # Type Checker
//!
//! Sits between the analyzer and lowering. It walks the parsed [`Expression`](crate::ast::Expression)
//! once, infers a [`TypeHandle`](crate::types::TypeHandle) for every node and decides how each
//! member access will be carried out at evaluation time.
//!
//! # Member Resolution
//! - Declared fields of object types become direct field reads
//! - Map properties read entries when property overriding is enabled
//! - Unknown members are rejected in strong typing mode and looked up by name otherwise
//! - Methods resolve to registered native methods first, then to built-in methods
//!
//! # Strong Typing
//! When [`CompilerOptions::strong_typing`](crate::config::CompilerOptions::strong_typing) is set,
//! any construct whose type would only be known at evaluation time is a
//! [`TypeCheckError::StrictTyping`] error.
//!
//! ```rust
//! use std::sync::Arc;
//! use field_accessor::{CompilerOptions, ParserConfiguration, TypeDef, TypeHandle, TypeRegistry};
//! use field_accessor::compiler::CompileScope;
//! use field_accessor::type_checker::TypeChecker;
//! use field_accessor::tokenizer::token::Tokenizer;
//! use field_accessor::analyzer::parse_tokens;
//!
//! let registry = TypeRegistry::new();
//! registry.register(TypeDef::new("Person").with_field("age", TypeHandle::Integer));
//! let scope = CompileScope::new(
//!     "this",
//!     TypeHandle::object("Person"),
//!     Arc::new(registry),
//!     Arc::new(ParserConfiguration::default()),
//!     CompilerOptions::for_accessor(true),
//! );
//!
//! let tokens = Tokenizer::new().tokenize("age + 1").unwrap();
//! let expr = parse_tokens(&tokens).unwrap();
//! let typed = TypeChecker::new(&scope).check(&expr).unwrap();
//! assert_eq!(typed.ty, TypeHandle::Integer);
//! ```

pub mod checker;
mod error;
pub mod typed;

pub use checker::TypeChecker;
pub use error::{TypeCheckError, TypeCheckResult};
pub use typed::{TypedExpression, TypedKind};
