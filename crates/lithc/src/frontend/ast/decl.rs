//! Declaration AST nodes

use super::Expr;
use crate::common::{Position, Span};
use crate::types::PrimitiveType;

/// Top-level declaration node
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub position: Position,
    pub span: Span,
}

impl Decl {
    pub fn new(kind: DeclKind, position: Position, span: Span) -> Self {
        Self {
            kind,
            position,
            span,
        }
    }
}

/// Declaration kinds
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// Function definition: fn add(a: int, b: int) -> int { a + b }
    Function(FunctionDecl),

    /// Variable or constant: let x: int = 5
    Variable(VarDecl),

    /// Textual include request: include "helpers.li"
    Include(IncludeDirective),

    /// Single-name import: from math import sqrt
    Import(ImportStatement),

    /// Multi-name import: from math import { sqrt, pow }
    SelectiveImport(SelectiveImport),
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: PrimitiveType,
    pub position: Position,
}

impl Param {
    pub fn new(name: String, ty: PrimitiveType, position: Position) -> Self {
        Self { name, ty, position }
    }
}

/// Function definition; the body is a single expression
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` when the return type is left to inference
    pub return_type: Option<PrimitiveType>,
    pub body: Box<Expr>,
}

impl FunctionDecl {
    pub fn new(name: String, params: Vec<Param>, body: Expr) -> Self {
        Self {
            name,
            params,
            return_type: None,
            body: Box::new(body),
        }
    }

    pub fn with_return_type(mut self, ty: PrimitiveType) -> Self {
        self.return_type = Some(ty);
        self
    }
}

/// Variable declaration (`let`) or constant (`const`)
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub declared_type: Option<PrimitiveType>,
    pub initializer: Option<Expr>,
    pub is_const: bool,
}

impl VarDecl {
    pub fn new(name: String, is_const: bool) -> Self {
        Self {
            name,
            declared_type: None,
            initializer: None,
            is_const,
        }
    }

    pub fn with_type(mut self, ty: PrimitiveType) -> Self {
        self.declared_type = Some(ty);
        self
    }

    pub fn with_initializer(mut self, init: Expr) -> Self {
        self.initializer = Some(init);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncludeDirective {
    /// Path exactly as written between the quotes
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub module: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectiveImport {
    pub module: String,
    pub names: Vec<String>,
}
