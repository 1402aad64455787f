//! Semantic analysis module
//!
//! This module resolves names through a scoped symbol table, checks types,
//! and validates include and import requests.

mod analyzer;
mod include;
mod resolver;
mod scope;
mod types;

pub use analyzer::{AnalysisState, ImportRecord, SemanticAnalyzer};
pub use include::IncludeResolver;
pub use resolver::{FsModuleResolver, ModuleExports, ModuleRegistry, ModuleResolver};
pub use scope::{Symbol, SymbolTable};
pub use types::TypeChecker;
