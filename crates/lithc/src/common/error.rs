//! Error types propagated inside a stage

use thiserror::Error;

use super::diagnostic::{Category, Diagnostic};
use super::{Position, Span};

/// Compile error with source location
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{position}: lexical error: {message}")]
    Lexer {
        message: String,
        position: Position,
        span: Span,
    },

    #[error("{position}: syntax error: {message}")]
    Parser {
        message: String,
        position: Position,
        span: Span,
    },

    #[error("{position}: semantic error: {message}")]
    Semantic {
        message: String,
        position: Position,
        span: Span,
    },

    #[error("{position}: type error: {message}")]
    Type {
        message: String,
        position: Position,
        span: Span,
    },

    #[error("{position}: file error: {message}")]
    FileIo {
        message: String,
        position: Position,
        span: Span,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, position: Position, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            position,
            span,
        }
    }

    pub fn parser(message: impl Into<String>, position: Position, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            position,
            span,
        }
    }

    pub fn semantic(message: impl Into<String>, position: Position, span: Span) -> Self {
        Self::Semantic {
            message: message.into(),
            position,
            span,
        }
    }

    pub fn type_error(message: impl Into<String>, position: Position, span: Span) -> Self {
        Self::Type {
            message: message.into(),
            position,
            span,
        }
    }

    pub fn file_io(message: impl Into<String>, position: Position, span: Span) -> Self {
        Self::FileIo {
            message: message.into(),
            position,
            span,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Lexer { .. } => Category::Lexical,
            Self::Parser { .. } => Category::Syntax,
            Self::Semantic { .. } => Category::Semantic,
            Self::Type { .. } => Category::Type,
            Self::FileIo { .. } | Self::Io(_) => Category::FileIo,
        }
    }

    /// Convert into an Error-severity diagnostic
    pub fn into_diagnostic(self) -> Diagnostic {
        let category = self.category();
        match self {
            Self::Lexer {
                message,
                position,
                span,
            }
            | Self::Parser {
                message,
                position,
                span,
            }
            | Self::Semantic {
                message,
                position,
                span,
            }
            | Self::Type {
                message,
                position,
                span,
            }
            | Self::FileIo {
                message,
                position,
                span,
            } => Diagnostic::error(category, position, message).with_span(span),
            Self::Io(err) => Diagnostic::error(category, Position::default(), err.to_string()),
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Severity;
    use std::sync::Arc;

    #[test]
    fn test_error_display_includes_position() {
        let pos = Position::new(Arc::from("a.li"), 3, 7);
        let err = CompileError::parser("expected ')'", pos, Span::new(20, 21));
        assert_eq!(err.to_string(), "a.li:3:7: syntax error: expected ')'");
        assert_eq!(err.category(), Category::Syntax);
    }

    #[test]
    fn test_into_diagnostic_keeps_span() {
        let pos = Position::new(Arc::from("a.li"), 1, 9);
        let diag = CompileError::type_error("mismatch", pos.clone(), Span::new(8, 9)).into_diagnostic();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.category, Category::Type);
        assert_eq!(diag.position, pos);
        assert_eq!(diag.span, Some(Span::new(8, 9)));
    }
}
