//! Parser module for building the Lithium AST

mod parser;

pub use parser::Parser;
