//! The Lithium front end
//!
//! The front end is responsible for:
//! 1. Scanning source text into tokens
//! 2. Parsing tokens into an AST
//! 3. Performing semantic analysis
//!
//! Each stage runs to completion; the pipeline halts before the next stage
//! once the shared reporter holds an error.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::DiagnosticReporter;

pub use ast::Program;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use sema::{FsModuleResolver, ImportRecord, SemanticAnalyzer, SymbolTable};

/// Configuration options passed to the front end
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub dump_symbols: bool,
    pub verbose: bool,
    /// Searched for `include` targets after the including file's directory
    pub include_paths: Vec<PathBuf>,
    /// Searched for imported modules after the input file's directory
    pub module_paths: Vec<PathBuf>,
}

/// Pipeline stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Scan,
    Parse,
    Analyze,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Read => "reading",
            Stage::Scan => "scanning",
            Stage::Parse => "parsing",
            Stage::Analyze => "analysis",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStatus {
    Succeeded,
    /// Stopped with errors after the given stage
    Failed(Stage),
}

/// Everything one compilation unit produced
pub struct FrontendOutput {
    pub reporter: DiagnosticReporter,
    pub tokens: Vec<Token>,
    pub program: Option<Program>,
    /// Final symbol table, present once analysis ran
    pub symbols: Option<SymbolTable>,
    pub includes: Vec<PathBuf>,
    pub imports: Vec<ImportRecord>,
    pub status: CompileStatus,
}

impl FrontendOutput {
    pub(crate) fn halted(reporter: DiagnosticReporter, stage: Stage) -> Self {
        Self {
            reporter,
            tokens: Vec::new(),
            program: None,
            symbols: None,
            includes: Vec::new(),
            imports: Vec::new(),
            status: CompileStatus::Failed(stage),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == CompileStatus::Succeeded
    }
}

/// Lithium language front end
pub struct LithiumFrontend;

impl LithiumFrontend {
    pub fn new() -> Self {
        Self
    }

    /// Run scanner, parser and analyzer over one source text
    pub fn compile(&self, source: &str, filename: &str, config: &FrontendConfig) -> FrontendOutput {
        let mut reporter = DiagnosticReporter::new();
        reporter.add_file(filename, source);

        // Phase 1: Scanning
        if config.verbose {
            eprintln!("Scanning {filename}...");
        }
        let tokens = lexer::tokenize(source, filename, &mut reporter);

        if config.dump_tokens {
            eprintln!("=== Lithium Tokens ===");
            for token in &tokens {
                eprintln!("{token:?}");
            }
            eprintln!("=== End Tokens ===\n");
        }

        if reporter.has_any_errors() {
            return Self::halt(reporter, tokens, None, Stage::Scan, config);
        }

        // Phase 2: Parsing
        if config.verbose {
            eprintln!("Parsing...");
        }
        let program = Parser::new(tokens.clone(), &mut reporter).parse();

        if config.dump_ast {
            eprintln!("=== Lithium AST ===");
            eprintln!("{program:#?}");
            eprintln!("=== End AST ===\n");
        }

        if reporter.has_any_errors() {
            return Self::halt(reporter, tokens, Some(program), Stage::Parse, config);
        }

        // Phase 3: Semantic Analysis
        if config.verbose {
            eprintln!("Analyzing...");
        }
        let source_dir = Path::new(filename)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut module_paths = vec![source_dir.to_path_buf()];
        module_paths.extend(config.module_paths.iter().cloned());

        let mut analyzer = SemanticAnalyzer::new()
            .with_resolver(FsModuleResolver::new(module_paths))
            .with_include_paths(config.include_paths.clone());
        let succeeded = analyzer.analyze(&program, &mut reporter);

        if config.dump_symbols {
            eprintln!("=== Lithium Symbols ===");
            for symbol in analyzer.symbols().global_symbols() {
                let kind = if symbol.is_const { "const" } else { "let" };
                eprintln!("{kind} {}: {} ({})", symbol.name, symbol.ty, symbol.position);
            }
            eprintln!("=== End Symbols ===\n");
        }

        let includes = analyzer.includes().to_vec();
        let imports = analyzer.imports().to_vec();
        let status = if succeeded {
            CompileStatus::Succeeded
        } else {
            CompileStatus::Failed(Stage::Analyze)
        };
        if config.verbose && !succeeded {
            eprintln!("Analysis failed with {} error(s)", reporter.error_count());
        }

        FrontendOutput {
            reporter,
            tokens,
            program: Some(program),
            symbols: Some(analyzer.into_symbols()),
            includes,
            imports,
            status,
        }
    }

    fn halt(
        reporter: DiagnosticReporter,
        tokens: Vec<Token>,
        program: Option<Program>,
        stage: Stage,
        config: &FrontendConfig,
    ) -> FrontendOutput {
        if config.verbose {
            eprintln!("Halting after {stage}: {} error(s)", reporter.error_count());
        }
        let mut output = FrontendOutput::halted(reporter, stage);
        output.tokens = tokens;
        output.program = program;
        output
    }
}

impl Default for LithiumFrontend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Category, Severity};

    fn compile(source: &str) -> FrontendOutput {
        LithiumFrontend::new().compile(source, "unit.li", &FrontendConfig::default())
    }

    #[test]
    fn test_clean_source_succeeds() {
        let output = compile("let x = 1\nfn inc(n: int) -> int { n + 1 }\nlet y = inc(x)\n");
        assert!(output.succeeded());
        assert!(output.reporter.diagnostics().is_empty());
        assert!(output.tokens.last().is_some_and(Token::is_eof));
        let symbols = output.symbols.unwrap();
        assert_eq!(symbols.lookup_symbol("y").unwrap().ty.to_string(), "int");
    }

    #[test]
    fn test_lexical_error_halts_before_parsing() {
        let output = compile("let x = 1 $\nlet y: string = 2\n");
        assert_eq!(output.status, CompileStatus::Failed(Stage::Scan));
        assert!(output.program.is_none());
        assert_eq!(output.reporter.diagnostics().len(), 1);
        assert_eq!(output.reporter.diagnostics()[0].category, Category::Lexical);
    }

    #[test]
    fn test_syntax_error_halts_before_analysis() {
        let output = compile("let x = (1\nlet y: string = 2\n");
        assert_eq!(output.status, CompileStatus::Failed(Stage::Parse));
        assert!(output.symbols.is_none());
        assert!(
            output
                .reporter
                .diagnostics()
                .iter()
                .all(|d| d.category == Category::Syntax)
        );
    }

    #[test]
    fn test_unterminated_string_is_the_only_diagnostic() {
        let output = compile("let x = \"oops");
        let diagnostics = output.reporter.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Fatal);
        assert_eq!(
            diagnostics[0].to_string(),
            "unit.li:1:9: fatal error: unterminated string literal\n  let x = \"oops"
        );
    }

    #[test]
    fn test_analysis_failure_keeps_program() {
        let output = compile("let x: string = 5\n");
        assert_eq!(output.status, CompileStatus::Failed(Stage::Analyze));
        assert!(output.program.is_some());
        assert_eq!(output.reporter.error_count(), 1);
    }
}
