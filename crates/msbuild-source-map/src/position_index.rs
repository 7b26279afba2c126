//! Offset <-> line/column translation for one text snapshot.

use crate::types::{Position, Range, Span};
use std::sync::Arc;

/// Line index over a single text snapshot.
///
/// Built in one pass over the text, recording the byte offset at which every
/// line starts. Offset-to-position lookups binary search that table; the
/// column is then measured in UTF-16 code units from the line start.
///
/// Offsets handed to this type must be char boundaries within `[0, len]`.
/// Anything else is a caller bug and panics.
#[derive(Debug, Clone)]
pub struct PositionIndex {
    text: Arc<str>,
    /// Byte offset of the first character of each line. Always starts with 0.
    line_starts: Vec<usize>,
}

impl PositionIndex {
    /// Index `text`, scanning it once for line breaks.
    ///
    /// # Example
    ///
    /// ```
    /// use msbuild_source_map::PositionIndex;
    ///
    /// let index = PositionIndex::new("line 1\nline 2\nline 3");
    /// assert_eq!(index.line_count(), 3);
    /// ```
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter_map(|(idx, b)| (b == b'\n').then_some(idx + 1)),
        );

        Self { text, line_starts }
    }

    /// The indexed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total length of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines. A text with `n` newlines has `n + 1` lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a line/column position.
    ///
    /// An offset sitting on a `\n` belongs to the line that newline terminates.
    ///
    /// # Panics
    ///
    /// If `offset` is past the end of the text or not on a char boundary.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        assert!(
            offset <= self.text.len() && self.text.is_char_boundary(offset),
            "offset {offset} is not a char boundary within a text of {} bytes",
            self.text.len()
        );

        let line = self.line_of(offset);
        let line_start = self.line_starts[line];
        let column = utf16_len(&self.text[line_start..offset]);

        Position::new(line as u32, column as u32)
    }

    /// Convert a line/column position to a byte offset.
    ///
    /// Positions come from the editor and may be stale, so a line past the
    /// end clamps to the last line and a column past the end of its line
    /// clamps to the line end (the offset of its terminating `\n`).
    pub fn position_to_offset(&self, position: Position) -> usize {
        let line = (position.line as usize).min(self.line_starts.len() - 1);
        let start = self.line_starts[line];
        let end = self.line_content_end(line);
        let target = position.character as usize;

        let mut units = 0;
        for (idx, ch) in self.text[start..end].char_indices() {
            if units >= target {
                return start + idx;
            }
            units += ch.len_utf16();
        }
        end
    }

    /// Convert a span to a range covering the same text.
    pub fn span_to_range(&self, span: Span) -> Range {
        Range::new(
            self.offset_to_position(span.start),
            self.offset_to_position(span.end()),
        )
    }

    /// Convert a range back to a span.
    pub fn range_to_span(&self, range: Range) -> Span {
        let start = self.position_to_offset(range.start);
        let end = self.position_to_offset(range.end).max(start);
        Span::from_bounds(start, end)
    }

    /// Move the start and end columns of `range`.
    ///
    /// Used to trim delimiters off a value range, e.g. `transform(range, 1, -1)`
    /// drops the surrounding quotes of an attribute value. Columns saturate at
    /// zero; the end never moves before the start.
    pub fn transform(&self, range: Range, move_start: i32, move_end: i32) -> Range {
        let start = Position::new(
            range.start.line,
            shift_column(range.start.character, move_start),
        );
        let mut end = Position::new(range.end.line, shift_column(range.end.character, move_end));
        if end < start {
            end = start;
        }
        Range::new(start, end)
    }

    fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// Offset of the `\n` ending `line`, or the text length for the last line.
    fn line_content_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        }
    }
}

fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

fn shift_column(column: u32, delta: i32) -> u32 {
    column.saturating_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let index = PositionIndex::new("");
        assert_eq!(index.len(), 0);
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.offset_to_position(0), Position::new(0, 0));
        assert_eq!(index.position_to_offset(Position::new(0, 0)), 0);
    }

    #[test]
    fn test_multiple_lines() {
        let index = PositionIndex::new("line 1\nline 2\nline 3");
        assert_eq!(index.line_count(), 3);

        assert_eq!(index.offset_to_position(0), Position::new(0, 0));
        // Offset 6 is the first '\n'; it belongs to line 0
        assert_eq!(index.offset_to_position(6), Position::new(0, 6));
        assert_eq!(index.offset_to_position(7), Position::new(1, 0));
        assert_eq!(index.offset_to_position(13), Position::new(1, 6));
        assert_eq!(index.offset_to_position(14), Position::new(2, 0));
        assert_eq!(index.offset_to_position(20), Position::new(2, 6));
    }

    #[test]
    fn test_text_ending_with_newline() {
        let index = PositionIndex::new("line 1\nline 2\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.offset_to_position(14), Position::new(2, 0));
        assert_eq!(index.position_to_offset(Position::new(2, 0)), 14);
    }

    #[test]
    fn test_columns_are_utf16_units() {
        // 'é' is 2 bytes / 1 UTF-16 unit, '𝄞' is 4 bytes / 2 UTF-16 units
        let text = "é𝄞x\nab";
        let index = PositionIndex::new(text);

        assert_eq!(index.offset_to_position(2), Position::new(0, 1));
        assert_eq!(index.offset_to_position(6), Position::new(0, 3));
        assert_eq!(index.offset_to_position(7), Position::new(0, 4));

        assert_eq!(index.position_to_offset(Position::new(0, 1)), 2);
        assert_eq!(index.position_to_offset(Position::new(0, 3)), 6);
        // Second line starts at byte 8
        assert_eq!(index.position_to_offset(Position::new(1, 1)), 9);
    }

    #[test]
    fn test_crlf_round_trips() {
        let text = "<a>\r\n<b/>\r\n";
        let index = PositionIndex::new(text);
        for offset in 0..=text.len() {
            let pos = index.offset_to_position(offset);
            assert_eq!(index.position_to_offset(pos), offset, "offset {offset}");
        }
        // The '\r' is part of line 0's columns
        assert_eq!(index.offset_to_position(3), Position::new(0, 3));
        assert_eq!(index.offset_to_position(4), Position::new(0, 4));
    }

    #[test]
    fn test_position_past_end_clamps() {
        let index = PositionIndex::new("abc\nde");
        assert_eq!(index.position_to_offset(Position::new(0, 99)), 3);
        assert_eq!(index.position_to_offset(Position::new(7, 1)), 5);
        assert_eq!(index.position_to_offset(Position::new(7, 99)), 6);
    }

    #[test]
    #[should_panic(expected = "not a char boundary")]
    fn test_offset_out_of_range_panics() {
        let index = PositionIndex::new("hello");
        index.offset_to_position(6);
    }

    #[test]
    fn test_span_to_range() {
        // `<b x="1"/>` starts at byte 6, column 2 of line 1
        let index = PositionIndex::new("<a>\n  <b x=\"1\"/>\n</a>");
        let range = index.span_to_range(Span::new(6, 10));
        assert_eq!(range.start, Position::new(1, 2));
        assert_eq!(range.end, Position::new(1, 12));
        assert_eq!(index.range_to_span(range), Span::new(6, 10));
    }

    #[test]
    fn test_transform_trims_quotes() {
        let index = PositionIndex::new("<b x=\"1.2.3\"/>");
        // `"1.2.3"` occupies columns 5..12
        let value = Range::new(Position::new(0, 5), Position::new(0, 12));
        let inner = index.transform(value, 1, -1);
        assert_eq!(inner, Range::new(Position::new(0, 6), Position::new(0, 11)));

        // Never inverts a range
        let empty = Range::new(Position::new(0, 5), Position::new(0, 6));
        let collapsed = index.transform(empty, 1, -1);
        assert_eq!(collapsed.start, collapsed.end);
    }

    #[test]
    fn test_stable_lookups() {
        let index = PositionIndex::new("one\ntwo\nthree");
        let first = index.offset_to_position(9);
        let second = index.offset_to_position(9);
        assert_eq!(first, second);
    }
}
