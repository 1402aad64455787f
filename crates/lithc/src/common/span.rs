//! Source locations: byte spans and line/column positions

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Byte range into a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Human-facing location: source name plus 1-based line and column.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub source: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(source: Arc<str>, line: usize, column: usize) -> Self {
        Self {
            source,
            line: line.max(1),
            column: column.max(1),
        }
    }

    /// Line 1, column 1 of `source`
    pub fn start_of(source: Arc<str>) -> Self {
        Self::new(source, 1, 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start_of(Arc::from(""))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// Maps byte offsets of one source text to [`Position`]s
#[derive(Debug, Clone)]
pub struct LineIndex {
    source_name: Arc<str>,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source_name: Arc<str>, text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            source_name,
            line_starts,
        }
    }

    /// Position of byte `offset` within `text` (the same text the index was built from)
    pub fn position(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());
        Position::new(Arc::clone(&self.source_name), line + 1, column + 1)
    }
}
