//! Semantic analyzer - scope resolution and type checking

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{Category, CompileError, Diagnostic, DiagnosticReporter, Position, Span};
use crate::frontend::ast::*;
use crate::types::{PrimitiveType, Type};

use super::include::IncludeResolver;
use super::resolver::{ModuleRegistry, ModuleResolver};
use super::scope::SymbolTable;
use super::types::TypeChecker;

/// Lifecycle of one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Fresh,
    Analyzing,
    Succeeded,
    Failed,
}

/// A resolved `from <module> import ...` request
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub module: String,
    pub names: Vec<String>,
    pub position: Position,
}

/// Semantic analyzer for type checking
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    checker: TypeChecker,
    resolver: Box<dyn ModuleResolver>,
    include_resolver: IncludeResolver,
    /// Canonical paths of accepted includes, in source order
    includes: Vec<PathBuf>,
    imports: Vec<ImportRecord>,
    state: AnalysisState,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            checker: TypeChecker::new(),
            resolver: Box::new(ModuleRegistry::new()),
            include_resolver: IncludeResolver::new(Vec::new()),
            includes: Vec::new(),
            imports: Vec::new(),
            state: AnalysisState::Fresh,
        }
    }

    pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_include_paths(mut self, include_paths: Vec<PathBuf>) -> Self {
        self.include_resolver = IncludeResolver::new(include_paths);
        self
    }

    /// Analyze a program; returns `true` iff the reporter holds no errors afterwards.
    ///
    /// Errors never stop the traversal, except that a fatal diagnostic skips
    /// every remaining declaration.
    pub fn analyze(&mut self, program: &Program, reporter: &mut DiagnosticReporter) -> bool {
        self.state = AnalysisState::Analyzing;

        for decl in &program.declarations {
            if reporter.has_fatal_error() {
                break;
            }
            self.analyze_declaration(decl, reporter);
        }

        self.state = if reporter.has_any_errors() {
            AnalysisState::Failed
        } else {
            AnalysisState::Succeeded
        };
        self.state == AnalysisState::Succeeded
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    pub fn includes(&self) -> &[PathBuf] {
        &self.includes
    }

    pub fn imports(&self) -> &[ImportRecord] {
        &self.imports
    }

    fn analyze_declaration(&mut self, decl: &Decl, reporter: &mut DiagnosticReporter) {
        match &decl.kind {
            DeclKind::Function(func) => self.analyze_function(func, decl, reporter),
            DeclKind::Variable(var) => self.analyze_var_decl(var, decl, reporter),
            DeclKind::Include(include) => self.analyze_include(include, decl, reporter),
            DeclKind::Import(import) => {
                self.analyze_import(&import.module, std::slice::from_ref(&import.name), decl, reporter);
            }
            DeclKind::SelectiveImport(import) => {
                self.analyze_import(&import.module, &import.names, decl, reporter);
            }
        }
    }

    fn analyze_function(&mut self, func: &FunctionDecl, decl: &Decl, reporter: &mut DiagnosticReporter) {
        let params: Vec<Type> = func.params.iter().map(|p| Type::primitive(p.ty)).collect();
        let declared_ret = func.return_type.map(Type::primitive);

        // Declared before the body so recursive calls resolve
        let provisional = Type::function(
            params.clone(),
            declared_ret
                .clone()
                .unwrap_or_else(|| Type::inferred(PrimitiveType::Any)),
        );
        let declared = self.declare(&func.name, provisional, false, decl.position.clone(), decl.span, reporter);

        self.symbols.enter_scope();
        for (param, ty) in func.params.iter().zip(&params) {
            if !self
                .symbols
                .declare_symbol(&param.name, ty.clone(), false, param.position.clone())
            {
                reporter.report_error(CompileError::semantic(
                    format!("duplicate parameter '{}' in function '{}'", param.name, func.name),
                    param.position.clone(),
                    decl.span,
                ));
            }
        }
        let body_ty = self.checker.infer_type(&func.body, &self.symbols, reporter);
        self.symbols.exit_scope();

        let ret = match declared_ret {
            Some(ret) => {
                self.checker.check_type_compatibility(
                    &ret,
                    &body_ty,
                    &func.body.position,
                    func.body.span,
                    reporter,
                );
                ret
            }
            None => body_ty,
        };

        if declared {
            self.symbols.refine_symbol(&func.name, Type::function(params, ret));
        }
    }

    fn analyze_var_decl(&mut self, var: &VarDecl, decl: &Decl, reporter: &mut DiagnosticReporter) {
        let declared = var.declared_type.map(Type::primitive);
        let init_ty = var
            .initializer
            .as_ref()
            .map(|init| (self.checker.infer_type(init, &self.symbols, reporter), init));

        let ty = match (declared, init_ty) {
            (Some(declared), Some((actual, init))) => {
                self.checker
                    .check_type_compatibility(&declared, &actual, &init.position, init.span, reporter);
                declared
            }
            (Some(declared), None) => declared,
            (None, Some((actual, _))) => actual,
            (None, None) => {
                reporter.report_error(CompileError::type_error(
                    format!(
                        "cannot infer the type of '{}' without a type annotation or initializer",
                        var.name
                    ),
                    decl.position.clone(),
                    decl.span,
                ));
                Type::recovery()
            }
        };

        if var.is_const && var.initializer.is_none() {
            reporter.report_error(CompileError::semantic(
                format!("constant '{}' must be initialized", var.name),
                decl.position.clone(),
                decl.span,
            ));
        }

        self.declare(&var.name, ty, var.is_const, decl.position.clone(), decl.span, reporter);
    }

    fn analyze_include(
        &mut self,
        include: &IncludeDirective,
        decl: &Decl,
        reporter: &mut DiagnosticReporter,
    ) {
        let including = Path::new(&*decl.position.source);
        let dir = including.parent().unwrap_or_else(|| Path::new("."));

        let Some(path) = self.include_resolver.locate(&include.path, dir) else {
            reporter.report_error(CompileError::file_io(
                format!("cannot find include file '{}'", include.path),
                decl.position.clone(),
                decl.span,
            ));
            return;
        };

        if let Ok(current) = fs::canonicalize(including) {
            if path == current {
                reporter.report_error(CompileError::file_io(
                    format!("'{}' includes itself", include.path),
                    decl.position.clone(),
                    decl.span,
                ));
                return;
            }
            if let Some(chain) = self.include_resolver.find_cycle(&path, &current) {
                let chain: Vec<String> = std::iter::once(&current)
                    .chain(&chain)
                    .map(|p| p.display().to_string())
                    .collect();
                reporter.report_error(CompileError::file_io(
                    format!("include cycle: {}", chain.join(" -> ")),
                    decl.position.clone(),
                    decl.span,
                ));
                return;
            }
        }

        if self.includes.contains(&path) {
            reporter.report(
                Diagnostic::warning(
                    Category::FileIo,
                    decl.position.clone(),
                    format!("'{}' is already included", include.path),
                )
                .with_span(decl.span),
            );
            return;
        }
        self.includes.push(path);
    }

    fn analyze_import(
        &mut self,
        module: &str,
        names: &[String],
        decl: &Decl,
        reporter: &mut DiagnosticReporter,
    ) {
        let Some(exports) = self.resolver.resolve(module) else {
            reporter.report_error(CompileError::semantic(
                format!("cannot resolve module '{module}'"),
                decl.position.clone(),
                decl.span,
            ));
            return;
        };

        for name in names {
            match exports.get(name) {
                Some(ty) => {
                    self.declare(name, ty.clone(), true, decl.position.clone(), decl.span, reporter);
                }
                None => reporter.report_error(CompileError::semantic(
                    format!("module '{module}' has no export named '{name}'"),
                    decl.position.clone(),
                    decl.span,
                )),
            }
        }

        self.imports.push(ImportRecord {
            module: module.to_string(),
            names: names.to_vec(),
            position: decl.position.clone(),
        });
    }

    /// Declare in the current scope, reporting a redeclaration
    fn declare(
        &mut self,
        name: &str,
        ty: Type,
        is_const: bool,
        position: Position,
        span: Span,
        reporter: &mut DiagnosticReporter,
    ) -> bool {
        if self.symbols.declare_symbol(name, ty, is_const, position.clone()) {
            return true;
        }
        let previous = self
            .symbols
            .lookup_symbol(name)
            .map(|s| format!(" (previously declared at {})", s.position))
            .unwrap_or_default();
        reporter.report_error(CompileError::semantic(
            format!("redeclaration of '{name}'{previous}"),
            position,
            span,
        ));
        false
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
