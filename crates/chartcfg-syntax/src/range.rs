//! Positions and ranges in a configuration document.
//!
//! All coordinates are 0-based. Columns are byte offsets into the line; the
//! line source keeps every line the same length as the original text, so a
//! column computed on a normalized line is valid against the raw document.

use smol_str::SmolStr;
use std::fmt;

/// A zero-based line/column point in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Line number.
    pub line: u32,
    /// Column within the line.
    pub character: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open `start..end` span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Range {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl Range {
    /// Creates a new range.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a range covering `start..end` on a single line.
    #[must_use]
    pub const fn on_line(line: u32, start: u32, end: u32) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}..{}:{}",
            self.start.line, self.start.character, self.end.line, self.end.character
        )
    }
}

/// A piece of document text together with where it was found.
///
/// Produced by the scanner and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextRange {
    /// The matched text (normalized, lowercase).
    pub text: SmolStr,
    /// Line the text was found on.
    pub line: u32,
    /// Start column (inclusive).
    pub start: u32,
    /// End column (exclusive).
    pub end: u32,
    /// Set for keyword forms that have an inline single-line equivalent and
    /// therefore never need a matching `end*`.
    pub can_be_unclosed: bool,
}

impl TextRange {
    /// Creates a new text range.
    pub fn new(text: impl Into<SmolStr>, line: u32, start: u32, end: u32) -> Self {
        Self {
            text: text.into(),
            line,
            start,
            end,
            can_be_unclosed: false,
        }
    }

    /// Builds a range for `text` starting at `start` on `line`.
    pub fn at(text: &str, line: u32, start: usize) -> Self {
        let start = to_u32(start);
        Self::new(text, line, start, start + to_u32(text.len()))
    }

    /// Marks the range as belonging to a keyword that may stay unclosed.
    #[must_use]
    pub fn unclosed(mut self, can_be_unclosed: bool) -> Self {
        self.can_be_unclosed = can_be_unclosed;
        self
    }

    /// Returns the range as line/column coordinates.
    #[must_use]
    pub fn range(&self) -> Range {
        Range::on_line(self.line, self.start, self.end)
    }

    /// Returns the text of the range.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

/// Converts a byte offset into a column, saturating on absurdly long lines.
#[must_use]
pub fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_range_at() {
        let range = TextRange::at("series", 3, 1);
        assert_eq!(range.range(), Range::on_line(3, 1, 7));
        assert!(!range.can_be_unclosed);
    }

    #[test]
    fn test_range_display() {
        assert_eq!(Range::on_line(2, 4, 9).to_string(), "2:4..2:9");
    }
}
