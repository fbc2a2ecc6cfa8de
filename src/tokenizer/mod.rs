//! # Tokenizer
//!
//! Lexical analysis of accessor expressions with nom: raw text in, a stream of
//! [`TokenSpan`](token::TokenSpan)s out. Every token keeps its line, column and byte range so
//! that parse errors can point at the offending input.
//!
//! * [`token`]: token types and the [`Tokenizer`](token::Tokenizer) driver
//! * [`keyword`]: `this`, `class`, `true`, `false`, `null`
//! * [`symbol`]: operators and delimiters
//! * [`literal`]: numbers and quoted text
//! * [`whitespace`]: blanks between tokens
//!
//! ```rust
//! use field_accessor::tokenizer::token::{Token, Tokenizer};
//!
//! let tokens = Tokenizer::new().tokenize("address.city").unwrap();
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].token, Token::Identifier("address".to_string()));
//! ```

pub mod keyword;
pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;
