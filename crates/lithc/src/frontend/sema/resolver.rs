//! Module resolution for `from <module> import ...`

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::common::DiagnosticReporter;
use crate::frontend::lexer::tokenize;
use crate::frontend::parser::Parser;
use crate::types::Type;

use super::SemanticAnalyzer;

/// Names a module makes available to importers, with their types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleExports {
    exports: HashMap<String, Type>,
}

impl ModuleExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.insert(name, ty);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: Type) {
        self.exports.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.exports.get(name)
    }

    /// Exported names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exports.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

/// Source of truth for which modules exist and what they export
pub trait ModuleResolver {
    /// Exports of `module`, or `None` if no such module is known
    fn resolve(&self, module: &str) -> Option<ModuleExports>;
}

/// In-memory table of declared external modules
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleExports>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: impl Into<String>, exports: ModuleExports) {
        self.modules.insert(module.into(), exports);
    }

    pub fn with_module(mut self, module: impl Into<String>, exports: ModuleExports) -> Self {
        self.register(module, exports);
        self
    }
}

impl ModuleResolver for ModuleRegistry {
    fn resolve(&self, module: &str) -> Option<ModuleExports> {
        self.modules.get(module).cloned()
    }
}

/// Resolves `<module>` to the first `<module>.li` found in the search paths.
///
/// The module is scanned, parsed and analyzed on its own; its top-level
/// functions and variables become its exports. Problems inside the module
/// are not reported to the importer. Each module name is resolved once per
/// resolver, misses included.
#[derive(Debug, Clone, Default)]
pub struct FsModuleResolver {
    search_paths: Vec<PathBuf>,
    cache: RefCell<HashMap<String, Option<ModuleExports>>>,
}

impl FsModuleResolver {
    pub const EXTENSION: &'static str = "li";

    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: RefCell::default(),
        }
    }

    fn find(&self, module: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(module).with_extension(Self::EXTENSION))
            .find(|candidate| candidate.is_file())
    }

    fn load(&self, module: &str) -> Option<ModuleExports> {
        let path = self.find(module)?;
        let source = fs::read_to_string(&path).ok()?;
        let name = path.display().to_string();

        let mut reporter = DiagnosticReporter::new();
        let tokens = tokenize(&source, name, &mut reporter);
        let program = Parser::new(tokens, &mut reporter).parse();

        // Nested imports are not followed
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze(&program, &mut reporter);
        let symbols = analyzer.symbols();

        let declared = program
            .functions()
            .map(|f| f.name.as_str())
            .chain(program.variables().map(|v| v.name.as_str()));

        let mut exports = ModuleExports::new();
        for name in declared {
            if let Some(symbol) = symbols.lookup_symbol(name) {
                exports.insert(name, symbol.ty.clone());
            }
        }
        Some(exports)
    }
}

impl ModuleResolver for FsModuleResolver {
    fn resolve(&self, module: &str) -> Option<ModuleExports> {
        if let Some(cached) = self.cache.borrow().get(module) {
            return cached.clone();
        }
        let exports = self.load(module);
        self.cache
            .borrow_mut()
            .insert(module.to_string(), exports.clone());
        exports
    }
}
