//! Lexer implementation using logos

use std::sync::Arc;

use super::token::{Token, TokenKind};
use crate::common::{Category, CompileError, Diagnostic, DiagnosticReporter, LineIndex, Position, Span};
use logos::Logos;

/// Lexer for Lithium source code
///
/// Bad characters are reported and skipped. An unterminated string is fatal:
/// the stream ends right there with an end-of-input token.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    lines: LineIndex,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str, source_name: impl Into<Arc<str>>) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            lines: LineIndex::new(source_name.into(), source),
            finished: false,
        }
    }

    /// Get the next token, or `None` once end-of-input has been produced
    pub fn next_token(&mut self, reporter: &mut DiagnosticReporter) -> Option<Token> {
        if self.finished {
            return None;
        }

        loop {
            match self.inner.next() {
                Some(Ok(kind)) => {
                    let span = self.span();
                    return Some(Token::new(
                        kind,
                        self.inner.slice(),
                        span,
                        self.position_at(span.start),
                    ));
                }
                Some(Err(())) => {
                    let span = self.span();
                    let position = self.position_at(span.start);
                    if self.inner.slice().starts_with('"') {
                        reporter.report(
                            Diagnostic::fatal(
                                Category::Lexical,
                                position.clone(),
                                "unterminated string literal",
                            )
                            .with_span(Span::new(span.start, self.source().len())),
                        );
                        self.finished = true;
                        return Some(Token::new(
                            TokenKind::Eof,
                            "",
                            Span::new(span.start, span.start),
                            position,
                        ));
                    }
                    reporter.report_error(CompileError::lexer(
                        format!("unexpected character '{}'", self.inner.slice()),
                        position,
                        span,
                    ));
                }
                None => {
                    self.finished = true;
                    let len = self.source().len();
                    return Some(Token::new(
                        TokenKind::Eof,
                        "",
                        Span::new(len, len),
                        self.position_at(len),
                    ));
                }
            }
        }
    }

    /// Tokenize the entire source; the result always ends with `Eof`
    pub fn tokenize_all(mut self, reporter: &mut DiagnosticReporter) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token(reporter) {
            tokens.push(token);
        }
        tokens
    }

    /// Get the source being lexed
    pub fn source(&self) -> &'a str {
        self.inner.source()
    }

    fn span(&self) -> Span {
        self.inner.span().into()
    }

    fn position_at(&self, offset: usize) -> Position {
        self.lines.position(self.source(), offset)
    }
}

/// Scan `source` into a terminated token sequence
pub fn tokenize(
    source: &str,
    source_name: impl Into<Arc<str>>,
    reporter: &mut DiagnosticReporter,
) -> Vec<Token> {
    Lexer::new(source, source_name).tokenize_all(reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Severity;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> (Vec<TokenKind>, DiagnosticReporter) {
        let mut reporter = DiagnosticReporter::new();
        let tokens = tokenize(source, "test.li", &mut reporter);
        (tokens.into_iter().map(|t| t.kind).collect(), reporter)
    }

    #[test]
    fn test_let_statement() {
        let (tokens, reporter) = kinds("let x = 5\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Let,
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::Number("5".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert!(reporter.diagnostics().is_empty());
    }

    #[test]
    fn test_keywords_and_types() {
        let (tokens, _) = kinds("fn let const include from int float string bool any void");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Fn,
                TokenKind::Let,
                TokenKind::Const,
                TokenKind::Include,
                TokenKind::From,
                TokenKind::IntType,
                TokenKind::FloatType,
                TokenKind::StringType,
                TokenKind::BoolType,
                TokenKind::AnyType,
                TokenKind::VoidType,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        let (tokens, _) = kinds("foo fnord _tmp x1 import");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Identifier("foo".into()),
                TokenKind::Identifier("fnord".into()),
                TokenKind::Identifier("_tmp".into()),
                TokenKind::Identifier("x1".into()),
                TokenKind::Identifier("import".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let (tokens, reporter) = kinds("42 3.14");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Number("42".into()),
                TokenKind::Number("3.14".into()),
                TokenKind::Eof,
            ]
        );
        assert!(!reporter.has_any_errors());
    }

    #[test]
    fn test_trailing_dot_is_not_part_of_number() {
        let (tokens, reporter) = kinds("1.");
        assert_eq!(tokens, vec![TokenKind::Number("1".into()), TokenKind::Eof]);
        assert_eq!(reporter.diagnostics().len(), 1);
        let diag = &reporter.diagnostics()[0];
        assert_eq!(diag.category, Category::Lexical);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!((diag.position.line, diag.position.column), (1, 2));
    }

    #[test]
    fn test_string_escapes() {
        let (tokens, _) = kinds(r#""a\nb""#);
        assert_eq!(tokens, vec![TokenKind::String("a\nb".into()), TokenKind::Eof]);

        let (tokens, _) = kinds(r#""tab\t quote\" slash\\ other\q""#);
        assert_eq!(
            tokens[0],
            TokenKind::String("tab\t quote\" slash\\ other\\q".into())
        );
    }

    #[test]
    fn test_operators_and_arrow() {
        let (tokens, _) = kinds("+ - * / = -> -1");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Assign,
                TokenKind::Arrow,
                TokenKind::Minus,
                TokenKind::Number("1".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_kept() {
        let (tokens, _) = kinds("x // note\ny");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Comment(" note".into()),
                TokenKind::Newline,
                TokenKind::Identifier("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_skipped() {
        let (tokens, reporter) = kinds("let $x = 1");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Let,
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::Number("1".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(reporter.error_count(), 1);
        assert!(!reporter.has_fatal_error());
        assert!(reporter.diagnostics()[0].message.contains('$'));
    }

    #[test]
    fn test_all_blank_characters_but_newline_are_skipped() {
        let (tokens, reporter) = kinds("a\x0Bb\t\x0Cc\r\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Identifier("b".into()),
                TokenKind::Identifier("c".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert!(reporter.diagnostics().is_empty());
    }

    #[test]
    fn test_token_classification() {
        let (tokens, _) = kinds("fn float x 1 \"s\" + -> ( , \n");
        let classes: Vec<_> = tokens
            .iter()
            .map(|k| {
                (
                    k.is_keyword(),
                    k.is_literal(),
                    k.is_operator(),
                    k.is_delimiter(),
                )
            })
            .collect();
        assert_eq!(
            classes,
            vec![
                (true, false, false, false),  // fn
                (true, false, false, false),  // float
                (false, true, false, false),  // x
                (false, true, false, false),  // 1
                (false, true, false, false),  // "s"
                (false, false, true, false),  // +
                (false, false, true, false),  // ->
                (false, false, false, true),  // (
                (false, false, false, true),  // ,
                (false, false, false, false), // newline
                (false, false, false, false), // eof
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        let (tokens, reporter) = kinds("let x = \"oops\nlet y = 2\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Let,
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
        assert_eq!(reporter.diagnostics().len(), 1);
        let diag = &reporter.diagnostics()[0];
        assert_eq!(diag.severity, Severity::Fatal);
        assert_eq!(diag.category, Category::Lexical);
        assert_eq!((diag.position.line, diag.position.column), (1, 9));
    }

    #[test]
    fn test_empty_source() {
        let (tokens, reporter) = kinds("");
        assert_eq!(tokens, vec![TokenKind::Eof]);
        assert!(reporter.diagnostics().is_empty());
    }

    #[test]
    fn test_positions_are_monotonic() {
        let mut reporter = DiagnosticReporter::new();
        let tokens = tokenize("fn f() {\n  1 + 2\n}\n", "pos.li", &mut reporter);
        let plus = tokens.iter().find(|t| t.kind == TokenKind::Plus).unwrap();
        assert_eq!((plus.position.line, plus.position.column), (2, 5));
        assert_eq!(&*plus.position.source, "pos.li");
        for pair in tokens.windows(2) {
            let (a, b) = (&pair[0].position, &pair[1].position);
            assert!((a.line, a.column) <= (b.line, b.column));
        }
    }

    #[test]
    fn test_rescanning_lexemes_is_stable() {
        let source = "fn add(a: int, b: float) -> float { a + b } // sum\nlet s = \"x\\ty\"\n";
        let mut reporter = DiagnosticReporter::new();
        let first = tokenize(source, "a.li", &mut reporter);
        let joined = first
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let second = tokenize(&joined, "b.li", &mut reporter);
        let first_kinds: Vec<_> = first.into_iter().map(|t| t.kind).collect();
        let second_kinds: Vec<_> = second.into_iter().map(|t| t.kind).collect();
        assert_eq!(first_kinds, second_kinds);
        assert!(!reporter.has_any_errors());
    }
}
