//! Compilation driver and pipeline orchestration

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::common::{Category, Diagnostic, DiagnosticReporter, Position};
use crate::frontend::{FrontendConfig, FrontendOutput, LithiumFrontend, Stage};

/// Compilation pipeline: one fresh reporter and analyzer per compilation unit
pub struct Pipeline {
    frontend: LithiumFrontend,
    config: FrontendConfig,
}

impl Pipeline {
    pub fn new(config: FrontendConfig) -> Self {
        Self {
            frontend: LithiumFrontend::new(),
            config,
        }
    }

    /// Compile in-memory source; `filename` is used for diagnostics and for
    /// resolving relative includes and modules
    pub fn compile_source(&self, source: &str, filename: &str) -> FrontendOutput {
        self.frontend.compile(source, filename, &self.config)
    }

    /// Read and compile a file; an unreadable input is a fatal diagnostic
    pub fn compile_file(&self, path: &Path) -> FrontendOutput {
        let filename = path.display().to_string();
        if self.config.verbose {
            eprintln!("Reading {filename}...");
        }

        match fs::read_to_string(path) {
            Ok(source) => self.compile_source(&source, &filename),
            Err(err) => {
                let mut reporter = DiagnosticReporter::new();
                reporter.report(Diagnostic::fatal(
                    Category::FileIo,
                    Position::start_of(Arc::from(filename.as_str())),
                    format!("cannot read input file '{filename}': {err}"),
                ));
                FrontendOutput::halted(reporter, Stage::Read)
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(FrontendConfig::default())
    }
}
