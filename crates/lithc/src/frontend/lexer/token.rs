//! Token definitions for the Lithium lexer

use crate::common::{Position, Span};
use crate::types::PrimitiveType;
use logos::Logos;
use std::fmt;

/// Token with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text the token was scanned from
    pub lexeme: String,
    pub span: Span,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span, position: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            position,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// Decode the body of a terminated string literal
fn unescape(lex: &mut logos::Lexer<'_, TokenKind>) -> String {
    let raw = lex.slice();
    let body = &raw[1..raw.len() - 1];
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('\\') => value.push('\\'),
            Some('"') => value.push('"'),
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }
    value
}

/// All token kinds in Lithium
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f\x0B]+")] // Newlines are significant, other whitespace is not
pub enum TokenKind {
    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r#""([^"\\]|\\.|\\\n)*""#, unescape)]
    String(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // === Keywords ===
    #[token("fn")]
    Fn,
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("include")]
    Include,
    #[token("from")]
    From,

    // Type keywords
    #[token("int")]
    IntType,
    #[token("float")]
    FloatType,
    #[token("string")]
    StringType,
    #[token("bool")]
    BoolType,
    #[token("any")]
    AnyType,
    #[token("void")]
    VoidType,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Assign,
    #[token("->")]
    Arrow,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,

    // === Structure ===
    #[token("\n")]
    Newline,

    /// Line comment; the payload excludes the leading `//`
    #[regex(r"//[^\n]*", |lex| lex.slice()[2..].to_string())]
    Comment(String),

    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Include
                | TokenKind::From
        ) || self.primitive_type().is_some()
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Number(_) | TokenKind::String(_) | TokenKind::Identifier(_)
        )
    }

    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Assign
                | TokenKind::Arrow
        )
    }

    pub fn is_delimiter(&self) -> bool {
        matches!(
            self,
            TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::Colon
                | TokenKind::Comma
        )
    }

    /// Primitive type named by a type keyword
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            TokenKind::IntType => PrimitiveType::Int,
            TokenKind::FloatType => PrimitiveType::Float,
            TokenKind::StringType => PrimitiveType::String,
            TokenKind::BoolType => PrimitiveType::Bool,
            TokenKind::AnyType => PrimitiveType::Any,
            TokenKind::VoidType => PrimitiveType::Void,
            _ => return None,
        })
    }

    /// Get the precedence of binary operators (higher = tighter binding)
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            // Additive
            TokenKind::Plus | TokenKind::Minus => Some(1),
            // Multiplicative
            TokenKind::Star | TokenKind::Slash => Some(2),
            _ => None,
        }
    }

    /// Check if this operator is right-associative
    pub fn is_right_associative(&self) -> bool {
        false
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(s) => write!(f, "number '{s}'"),
            TokenKind::String(s) => write!(f, "string {s:?}"),
            TokenKind::Identifier(s) => write!(f, "identifier '{s}'"),
            TokenKind::Fn => write!(f, "'fn'"),
            TokenKind::Let => write!(f, "'let'"),
            TokenKind::Const => write!(f, "'const'"),
            TokenKind::Include => write!(f, "'include'"),
            TokenKind::From => write!(f, "'from'"),
            TokenKind::IntType => write!(f, "'int'"),
            TokenKind::FloatType => write!(f, "'float'"),
            TokenKind::StringType => write!(f, "'string'"),
            TokenKind::BoolType => write!(f, "'bool'"),
            TokenKind::AnyType => write!(f, "'any'"),
            TokenKind::VoidType => write!(f, "'void'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}
