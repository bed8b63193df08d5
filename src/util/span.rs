//! Declaration locations
//!
//! Symbols remember where they were declared so that constraint diagnostics
//! can point back at the offending template parameter.

use std::fmt;

/// Source position (line, column, and byte offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start of file
    pub offset: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            line,
            column,
            offset: 0,
        }
    }

    /// Create a new position with offset
    #[inline]
    pub fn with_offset(
        line: usize,
        column: usize,
        offset: usize,
    ) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source span (start position to end position)
///
/// Synthesized symbols (core library types, substituted members) carry
/// [`Span::dummy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    #[inline]
    pub fn new(
        start: Position,
        end: Position,
    ) -> Self {
        Self { start, end }
    }

    /// Span covering a single identifier at `line:column`
    #[inline]
    pub fn at(
        line: usize,
        column: usize,
        len: usize,
    ) -> Self {
        Self {
            start: Position::new(line, column),
            end: Position::new(line, column + len),
        }
    }

    /// Create a dummy span
    #[inline]
    pub fn dummy() -> Self {
        Self::default()
    }

    /// Check if this is a dummy span
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.start.line == 0
    }

    /// Smallest span enclosing both `self` and `other`
    pub fn merge(
        self,
        other: Span,
    ) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.is_dummy() {
            write!(f, "<synthesized>")
        } else {
            write!(f, "[{} - {}]", self.start, self.end)
        }
    }
}
