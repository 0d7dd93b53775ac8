//! Position and location tracking for source code locations.
//!
//! - [`Position`] - a line:column position in source code
//! - [`Range`] - a source range with start/end positions and byte span
//! - [`SourceLocation`] - converts byte offsets to line/column positions in O(log n)
//!
//! All AST nodes and tokens carry a mandatory `Range`; there is no null location, only the
//! zero-width default at (0, 0).

use std::fmt;
use std::ops::Range as ByteRange;

/// A line:column position in source code. Both are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// A source range: a byte span plus its start/end line:column positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub span: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(span: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }

    /// A zero-width range starting and ending at `pos`, with no known byte span.
    pub fn at(pos: Position) -> Self {
        Self::new(0..0, pos, pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        (self.start.line < pos.line || (self.start.line == pos.line && self.start.column <= pos.column))
            && (self.end.line > pos.line || (self.end.line == pos.line && self.end.column >= pos.column))
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.contains(other.start)
            || self.contains(other.end)
            || other.contains(self.start)
            || other.contains(self.end)
    }

    /// Build a bounding box that contains all provided ranges.
    pub fn bounding_box<'a, I>(mut ranges: I) -> Option<Range>
    where
        I: Iterator<Item = &'a Range>,
    {
        let first = ranges.next()?.clone();
        let mut span_start = first.span.start;
        let mut span_end = first.span.end;
        let mut start_pos = first.start;
        let mut end_pos = first.end;

        for range in ranges {
            if range.start < start_pos {
                start_pos = range.start;
                span_start = range.span.start;
            } else if range.start == start_pos {
                span_start = span_start.min(range.span.start);
            }

            if range.end > end_pos {
                end_pos = range.end;
                span_end = range.span.end;
            } else if range.end == end_pos {
                span_end = span_end.max(range.span.end);
            }
        }

        Some(Range::new(span_start..span_end, start_pos, end_pos))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::new(ByteRange { start: 0, end: 0 }, Position::default(), Position::default())
    }
}

/// Converts byte offsets into `Position`s by caching each line's starting byte offset.
pub struct SourceLocation {
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self { line_starts }
    }

    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);
        let column = byte_offset - self.line_starts[line];
        Position::new(line, column)
    }

    pub fn byte_range_to_range(&self, range: &ByteRange<usize>) -> Range {
        Range::new(range.clone(), self.byte_to_position(range.start), self.byte_to_position(range.end))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_ordering() {
        assert!(Position::new(1, 5) < Position::new(2, 0));
        assert_eq!(Position::new(1, 5), Position::new(1, 5));
    }

    #[test]
    fn range_contains_multiline() {
        let r = Range::new(0..0, Position::new(1, 5), Position::new(2, 10));
        assert!(!r.contains(Position::new(1, 4)));
        assert!(r.contains(Position::new(1, 5)));
        assert!(r.contains(Position::new(2, 10)));
        assert!(!r.contains(Position::new(2, 11)));
    }

    #[test]
    fn range_overlaps() {
        let a = Range::new(0..0, Position::new(0, 0), Position::new(1, 5));
        let b = Range::new(0..0, Position::new(1, 0), Position::new(2, 5));
        let c = Range::new(0..0, Position::new(3, 0), Position::new(4, 5));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn bounding_box_of_ranges() {
        let ranges = [
            Range::new(2..5, Position::new(0, 2), Position::new(0, 5)),
            Range::new(10..20, Position::new(3, 0), Position::new(4, 3)),
        ];
        let bbox = Range::bounding_box(ranges.iter()).unwrap();
        assert_eq!(bbox.span, 2..20);
        assert_eq!(bbox.start, Position::new(0, 2));
        assert_eq!(bbox.end, Position::new(4, 3));
    }

    #[test]
    fn bounding_box_empty_is_none() {
        assert!(Range::bounding_box(std::iter::empty::<&Range>()).is_none());
    }

    #[test]
    fn byte_to_position_multiline_unicode() {
        let loc = SourceLocation::new("Hello\nwörld");
        assert_eq!(loc.byte_to_position(6), Position::new(1, 0));
        assert_eq!(loc.byte_to_position(7), Position::new(1, 1));
    }

    #[test]
    fn byte_range_to_range_multiline() {
        let loc = SourceLocation::new("Hello\nWorld\nTest");
        let r = loc.byte_range_to_range(&(6..12));
        assert_eq!(r.start, Position::new(1, 0));
        assert_eq!(r.end, Position::new(2, 0));
    }

    #[test]
    fn line_count_and_start() {
        let loc = SourceLocation::new("a\nb\nc");
        assert_eq!(loc.line_count(), 3);
        assert_eq!(loc.line_start(1), Some(2));
        assert_eq!(loc.line_start(3), None);
    }
}
