//! Lexer module for tokenizing Lithium source code

mod scanner;
mod token;

pub use scanner::{Lexer, tokenize};
pub use token::{Token, TokenKind};
