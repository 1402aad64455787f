//! Lithium Compiler - front end for the Lithium language
//!
//! This library turns Lithium source text into a validated AST plus the
//! symbol table a code generator needs.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Frontend** (`frontend/`): Scanning, parsing and semantic analysis
//! - **Driver** (`driver/`): Per-file pipeline orchestration
//! - **Common** (`common/`): Shared infrastructure (diagnostics, errors, spans)
//! - **Types** (`types/`): The Lithium type model

pub mod common;
pub mod driver;
pub mod frontend;
pub mod types;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, Diagnostic, DiagnosticReporter, Position, Span};
pub use driver::Pipeline;
pub use frontend::{CompileStatus, FrontendConfig, FrontendOutput, LithiumFrontend};
