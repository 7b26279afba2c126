//! Core coordinate types.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A region of source text in absolute byte offsets.
///
/// Containment is right-closed: an offset equal to [`Span::end`] is inside
/// the span. When two sibling spans touch, the preceding one therefore claims
/// the shared boundary, which is what keeps cursor lookups stable at element
/// edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Length in bytes.
    pub length: usize,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Build a span from a `[start, end)` pair of offsets.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is past its end {end}");
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// Offset one past the last byte.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Right-closed containment: `start <= offset <= end`.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end()
    }

    /// Half-open containment: `start <= offset < end`.
    pub fn contains_exclusive(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end()
    }

    /// Whether `other` lies entirely within this span.
    pub fn encloses(&self, other: &Span) -> bool {
        self.start <= other.start && other.end() <= self.end()
    }

    /// Shrink the span by `leading` bytes at the front and `trailing` at the back.
    ///
    /// Used to strip delimiters such as quotes. Never produces a negative length.
    pub fn trim(&self, leading: usize, trailing: usize) -> Span {
        if leading + trailing >= self.length {
            let start = (self.start + leading).min(self.end());
            return Span::new(start, 0);
        }
        Span::new(self.start + leading, self.length - leading - trailing)
    }
}

/// A position in a text document, expressed as zero-based line and character offset.
///
/// Character offsets are measured in UTF-16 code units to match the editor protocol.
/// For ASCII text, this is equivalent to the byte offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based character offset (UTF-16 code units).
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.line.cmp(&other.line) {
            Ordering::Equal => self.character.cmp(&other.character),
            ord => ord,
        }
    }
}

/// A range in a text document, expressed as start and end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    /// The range's start position (inclusive).
    pub start: Position,
    /// The range's end position (exclusive).
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `pos`.
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Check if this range contains a position (end exclusive).
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
