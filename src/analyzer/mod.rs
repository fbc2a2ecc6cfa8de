//! # Analyzer
//!
//! Turns the token stream into an [`ast::Expression`] with small parser combinators over
//! `&[Token]`. [`parsers::parse_tokens`] is the entry point.

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;

pub use core::ParseError;
pub use core::ParseResult;
pub use core::Parser;
pub use parsers::parse_tokens;

pub use crate::ast;
