//! # Tokenizer/ Lexer
//!
//! Splits a JSON document into a flat array of tokens ordered depth-first,
//! validating only the structure of the input.
pub mod lexer;
pub mod token;

// Re-exports
pub use lexer::tokenize;
pub use token::{ParsedKind, Token, TokenType};
pub(crate) use token::Payload;
