//! Abstract Syntax Tree definitions
//!
//! The tree is owned top-down: every node owns its children by value or
//! through `Box`, so a `Program` can be moved or dropped as a unit.

mod decl;
mod expr;

pub use decl::*;
pub use expr::*;

use crate::common::Position;

/// A complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub declarations: Vec<Decl>,
    pub position: Position,
}

impl Program {
    pub fn new(declarations: Vec<Decl>, position: Position) -> Self {
        Self {
            declarations,
            position,
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.declarations.iter().filter_map(|decl| match &decl.kind {
            DeclKind::Function(func) => Some(func),
            _ => None,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &VarDecl> {
        self.declarations.iter().filter_map(|decl| match &decl.kind {
            DeclKind::Variable(var) => Some(var),
            _ => None,
        })
    }
}
