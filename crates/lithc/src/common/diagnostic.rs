//! Diagnostic accumulation and reporting

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity as CsSeverity};
use codespan_reporting::files::{self, Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::WriteColor;

use super::{CompileError, Position, Span};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
    /// Stops the pipeline immediately
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        })
    }
}

/// Which stage concern produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Lexical,
    Syntax,
    Semantic,
    Type,
    FileIo,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Lexical => "lexical",
            Category::Syntax => "syntax",
            Category::Semantic => "semantic",
            Category::Type => "type",
            Category::FileIo => "file I/O",
        })
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub position: Position,
    pub span: Option<Span>,
    pub message: String,
    /// Offending source line, printed indented under the message
    pub context: Option<String>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        category: Category,
        position: Position,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            position,
            span: None,
            message: message.into(),
            context: None,
        }
    }

    pub fn warning(category: Category, position: Position, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, position, message)
    }

    pub fn error(category: Category, position: Position, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, position, message)
    }

    pub fn fatal(category: Category, position: Position, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, category, position, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.position, self.severity, self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\n  {}", context.trim_end())?;
        }
        Ok(())
    }
}

/// Append-only diagnostic stream shared by every stage of one compilation unit
pub struct DiagnosticReporter {
    diagnostics: Vec<Diagnostic>,
    files: SimpleFiles<String, String>,
    file_ids: HashMap<String, usize>,
    has_errors: bool,
    has_fatal: bool,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            files: SimpleFiles::new(),
            file_ids: HashMap::new(),
            has_errors: false,
            has_fatal: false,
        }
    }

    /// Register source text so diagnostics can quote and label it
    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        let name = name.into();
        let id = self.files.add(name.clone(), source.into());
        self.file_ids.insert(name, id);
        id
    }

    pub fn report(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.context.is_none() {
            diagnostic.context = self.source_line(&diagnostic.position);
        }
        match diagnostic.severity {
            Severity::Warning => {}
            Severity::Error => self.has_errors = true,
            Severity::Fatal => {
                self.has_errors = true;
                self.has_fatal = true;
            }
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn report_error(&mut self, error: CompileError) {
        self.report(error.into_diagnostic());
    }

    pub fn report_lexical_error(&mut self, position: Position, message: impl Into<String>) {
        self.report(Diagnostic::error(Category::Lexical, position, message));
    }

    pub fn report_syntax_error(&mut self, position: Position, message: impl Into<String>) {
        self.report(Diagnostic::error(Category::Syntax, position, message));
    }

    pub fn report_semantic_error(&mut self, position: Position, message: impl Into<String>) {
        self.report(Diagnostic::error(Category::Semantic, position, message));
    }

    pub fn report_type_error(&mut self, position: Position, message: impl Into<String>) {
        self.report(Diagnostic::error(Category::Type, position, message));
    }

    pub fn report_file_error(&mut self, position: Position, message: impl Into<String>) {
        self.report(Diagnostic::error(Category::FileIo, position, message));
    }

    pub fn report_warning(
        &mut self,
        category: Category,
        position: Position,
        message: impl Into<String>,
    ) {
        self.report(Diagnostic::warning(category, position, message));
    }

    /// True once any Error or Fatal diagnostic was reported
    pub fn has_any_errors(&self) -> bool {
        self.has_errors
    }

    pub fn has_fatal_error(&self) -> bool {
        self.has_fatal
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.has_errors = false;
        self.has_fatal = false;
    }

    /// Render every diagnostic as `<file>:<line>:<column>: <severity>: <message>`
    pub fn emit_short(&self, out: &mut impl io::Write) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(out, "{diagnostic}")?;
        }
        Ok(())
    }

    /// Render every diagnostic with labelled source snippets
    pub fn emit(&self, writer: &mut dyn WriteColor) -> Result<(), files::Error> {
        let config = term::Config::default();
        for diagnostic in &self.diagnostics {
            let rendered = self.to_codespan(diagnostic);
            term::emit(writer, &config, &self.files, &rendered)?;
        }
        Ok(())
    }

    fn to_codespan(&self, diagnostic: &Diagnostic) -> CsDiagnostic<usize> {
        let (severity, title) = match diagnostic.severity {
            Severity::Warning => (CsSeverity::Warning, format!("{} warning", diagnostic.category)),
            Severity::Error => (CsSeverity::Error, format!("{} error", diagnostic.category)),
            Severity::Fatal => (CsSeverity::Error, format!("fatal {} error", diagnostic.category)),
        };

        let file_id = self.file_ids.get(&*diagnostic.position.source).copied();
        let range = file_id.and_then(|id| self.label_range(id, diagnostic));

        match (file_id, range) {
            (Some(id), Some(range)) => CsDiagnostic::new(severity)
                .with_message(title)
                .with_labels(vec![
                    Label::primary(id, range).with_message(diagnostic.message.clone()),
                ]),
            _ => CsDiagnostic::new(severity)
                .with_message(format!("{title}: {}", diagnostic.message))
                .with_notes(vec![format!("at {}", diagnostic.position)]),
        }
    }

    fn label_range(&self, file_id: usize, diagnostic: &Diagnostic) -> Option<Range<usize>> {
        if let Some(span) = diagnostic.span {
            return Some(span.into());
        }
        let line = self
            .files
            .line_range(file_id, diagnostic.position.line.checked_sub(1)?)
            .ok()?;
        let text = self.files.get(file_id).ok()?.source().get(line.clone())?;
        let offset = text
            .char_indices()
            .nth(diagnostic.position.column - 1)
            .map_or(text.len(), |(i, _)| i);
        let start = line.start + offset;
        let end = text[offset..]
            .chars()
            .next()
            .map_or(start, |c| start + c.len_utf8());
        Some(start..end)
    }

    fn source_line(&self, position: &Position) -> Option<String> {
        let id = *self.file_ids.get(&*position.source)?;
        let source = self.files.get(id).ok()?.source();
        source
            .lines()
            .nth(position.line.checked_sub(1)?)
            .map(|line| line.trim_end_matches('\r').to_string())
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codespan_reporting::term::termcolor::NoColor;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(Arc::from("main.li"), line, column)
    }

    #[test]
    fn test_flags_track_severity() {
        let mut reporter = DiagnosticReporter::new();
        reporter.report_warning(Category::FileIo, pos(1, 1), "already included");
        assert!(!reporter.has_any_errors());

        reporter.report_type_error(pos(1, 5), "mismatch");
        assert!(reporter.has_any_errors());
        assert!(!reporter.has_fatal_error());

        reporter.report(Diagnostic::fatal(Category::Lexical, pos(2, 1), "unterminated string"));
        assert!(reporter.has_fatal_error());
        assert_eq!(reporter.error_count(), 2);
        assert_eq!(reporter.diagnostics().len(), 3);

        reporter.clear();
        assert!(!reporter.has_any_errors());
        assert!(reporter.diagnostics().is_empty());
    }

    #[test]
    fn test_category_helpers() {
        let mut reporter = DiagnosticReporter::new();
        reporter.report_lexical_error(pos(1, 1), "bad char");
        reporter.report_syntax_error(pos(1, 2), "expected expression");
        reporter.report_semantic_error(pos(1, 3), "undeclared identifier");
        reporter.report_type_error(pos(1, 4), "mismatch");
        reporter.report_file_error(pos(1, 5), "missing include");

        let found: Vec<_> = reporter
            .diagnostics()
            .iter()
            .map(|d| (d.category, d.severity))
            .collect();
        assert_eq!(
            found,
            vec![
                (Category::Lexical, Severity::Error),
                (Category::Syntax, Severity::Error),
                (Category::Semantic, Severity::Error),
                (Category::Type, Severity::Error),
                (Category::FileIo, Severity::Error),
            ]
        );
        assert_eq!(reporter.error_count(), 5);
    }

    #[test]
    fn test_short_format_with_context() {
        let mut reporter = DiagnosticReporter::new();
        reporter.add_file("main.li", "let x = 1\nlet y: string = 5\n");
        reporter.report_type_error(pos(2, 17), "expected 'string', found 'int'");

        let mut out = Vec::new();
        reporter.emit_short(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "main.li:2:17: error: expected 'string', found 'int'\n  let y: string = 5\n"
        );
    }

    #[test]
    fn test_explicit_context_is_kept() {
        let mut reporter = DiagnosticReporter::new();
        reporter.add_file("main.li", "let x = 1\n");
        reporter.report(
            Diagnostic::error(Category::Semantic, pos(1, 5), "bad").with_context("custom"),
        );
        assert_eq!(reporter.diagnostics()[0].context.as_deref(), Some("custom"));
    }

    #[test]
    fn test_unregistered_file_has_no_context() {
        let mut reporter = DiagnosticReporter::new();
        reporter.report_syntax_error(pos(1, 1), "expected declaration");
        assert_eq!(
            reporter.diagnostics()[0].to_string(),
            "main.li:1:1: error: expected declaration"
        );
    }

    #[test]
    fn test_codespan_rendering_labels_source() {
        let mut reporter = DiagnosticReporter::new();
        reporter.add_file("main.li", "let x: string = 5\n");
        reporter.report_type_error(pos(1, 17), "expected 'string', found 'int'");

        let mut writer = NoColor::new(Vec::new());
        reporter.emit(&mut writer).unwrap();
        let rendered = String::from_utf8(writer.into_inner()).unwrap();
        assert!(rendered.contains("type error"));
        assert!(rendered.contains("main.li:1:17"));
        assert!(rendered.contains("expected 'string', found 'int'"));
    }
}
