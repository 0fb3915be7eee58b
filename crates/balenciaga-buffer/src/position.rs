//! Line/column positions and line-oriented scans over `&str`.
//!
//! Lines are separated by `\n` only. Columns count UTF-16 code units,
//! matching the offsets in [`TextRange`].

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::selection::TextRange;
use crate::utf16::{byte_to_utf16, utf16_len, utf16_to_byte};

/// A user-facing position in the text.
///
/// Both line and column are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in UTF-16 units)
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Resolves a UTF-16 offset into a 1-based line and column.
///
/// The offset is clamped to the text length first.
pub fn line_column(text: &str, offset: usize) -> Position {
    let byte = utf16_to_byte(text, offset);
    let prefix = &text[..byte];
    let line = prefix.matches('\n').count() + 1;
    let column = match prefix.rfind('\n') {
        Some(newline) => utf16_len(&prefix[newline + 1..]) + 1,
        None => utf16_len(prefix) + 1,
    };
    Position { line, column }
}

/// Returns the UTF-16 offset at which 1-based `line` starts.
///
/// For `line <= 1` this is 0. Otherwise it is the offset just past the
/// `(line - 1)`-th newline. When the text has fewer lines the scan stops
/// after the last newline it found.
pub fn offset_of_line(text: &str, line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    let mut byte = 0;
    for (current, (idx, _)) in text.match_indices('\n').enumerate() {
        byte = idx + 1;
        if current + 2 >= line {
            break;
        }
    }
    byte_to_utf16(text, byte)
}

/// Expands `range` to cover whole lines.
///
/// The result starts at the beginning of the line holding `range.location`
/// and ends after the newline terminating the line that holds the last
/// selected unit (or at the end of the text).
pub fn line_range(text: &str, range: TextRange) -> TextRange {
    let range = range.clamped(utf16_len(text));
    let start = utf16_to_byte(text, range.location);
    let last = if range.is_empty() {
        start
    } else {
        utf16_to_byte(text, range.end())
    };

    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = if !range.is_empty() && text[..last].ends_with('\n') {
        last
    } else {
        text[last..].find('\n').map_or(text.len(), |i| last + i + 1)
    };

    let location = byte_to_utf16(text, line_start);
    TextRange::new(location, byte_to_utf16(text, line_end) - location)
}

/// Finds the run of identifier characters that ends at `cursor`.
///
/// Scans backwards over ASCII letters, digits and underscores. The
/// returned range is empty when the character before the cursor is not an
/// identifier character, or when the cursor splits a surrogate pair.
pub fn identifier_prefix_range(text: &str, cursor: usize) -> TextRange {
    let cursor = cursor.min(utf16_len(text));
    let end = utf16_to_byte(text, cursor);
    if byte_to_utf16(text, end) != cursor {
        return TextRange::caret(cursor);
    }
    let length = text.as_bytes()[..end]
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    // identifier bytes are ASCII, so bytes and UTF-16 units agree
    TextRange::new(cursor - length, length)
}

/// Counts user-perceived characters (extended grapheme clusters).
pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_line_column() {
        let text = "a\nb\nc";
        assert_eq!(line_column(text, 0), Position::new(1, 1));
        assert_eq!(line_column(text, 2), Position::new(2, 1));
        assert_eq!(line_column(text, 5), Position::new(3, 2));
        assert_eq!(line_column(text, 99), Position::new(3, 2));
    }

    #[test]
    fn test_offset_of_line() {
        let text = "a\nb\nc";
        assert_eq!(offset_of_line(text, 0), 0);
        assert_eq!(offset_of_line(text, 1), 0);
        assert_eq!(offset_of_line(text, 2), 2);
        assert_eq!(offset_of_line(text, 3), 4);
        // past the last line: stays after the final newline
        assert_eq!(offset_of_line(text, 10), 4);
        assert_eq!(offset_of_line("no newline", 4), 0);
    }

    #[test]
    fn test_line_range_partial_selection() {
        let text = "Title\nLine";
        assert_eq!(line_range(text, TextRange::new(0, 5)), TextRange::new(0, 6));
        assert_eq!(line_range(text, TextRange::new(0, 6)), TextRange::new(0, 6));
        assert_eq!(line_range(text, TextRange::new(7, 0)), TextRange::new(6, 4));
    }

    #[test]
    fn test_line_range_multiple_lines() {
        let text = "One\nTwo";
        assert_eq!(line_range(text, TextRange::new(0, 7)), TextRange::new(0, 7));
        assert_eq!(line_range(text, TextRange::new(2, 3)), TextRange::new(0, 7));
    }

    #[test]
    fn test_identifier_prefix() {
        let text = "let sampleValue = samp";
        let range = identifier_prefix_range(text, utf16_len(text));
        assert_eq!(range, TextRange::new(18, 4));

        assert!(identifier_prefix_range("foo ", 4).is_empty());
        assert!(identifier_prefix_range("", 0).is_empty());
        assert_eq!(identifier_prefix_range("é_x1", 4), TextRange::new(1, 3));
        assert_eq!(identifier_prefix_range("ab😀", 3), TextRange::caret(3));
        assert_eq!(identifier_prefix_range("ab😀c", 5), TextRange::new(4, 1));
    }

    #[test]
    fn test_grapheme_count() {
        assert_eq!(grapheme_count(""), 0);
        assert_eq!(grapheme_count("e\u{301}x"), 2);
    }

    proptest! {
        #[test]
        fn go_to_line_lands_on_column_one(lines in prop::collection::vec("[a-z é]{0,8}", 1..12), pick in 0usize..12) {
            let text = lines.join("\n");
            let line = pick % lines.len() + 1;
            let offset = offset_of_line(&text, line);
            prop_assert_eq!(line_column(&text, offset), Position::new(line, 1));
        }
    }
}
