//! Common infrastructure shared by every front-end stage

mod diagnostic;
mod error;
mod span;

pub use diagnostic::{Category, Diagnostic, DiagnosticReporter, Severity};
pub use error::{CompileError, CompileResult};
pub use span::{LineIndex, Position, Span};
