//! # Balenciaga Buffer
//!
//! Text storage for the editor, addressed the way native text widgets
//! address it: offsets and lengths count UTF-16 code units.
//!
//! ## Why UTF-16 offsets?
//!
//! Selections arrive from a platform text view that counts UTF-16 units.
//! Rust strings are UTF-8, so every boundary crossing needs a conversion.
//! Keeping that conversion in one crate means the rest of the editor can
//! pass `TextRange` values around without caring about encodings.
//!
//! - `TextBuffer` owns a rope and edits it by UTF-16 range
//! - `TextRange` is a location/length pair that can be clamped to a text
//! - The free functions work on plain `&str` snapshots, for callers that
//!   only read (completion, diagnostics)

mod buffer;
mod position;
mod selection;
mod utf16;

pub use buffer::TextBuffer;
pub use position::{
    Position, grapheme_count, identifier_prefix_range, line_column, line_range, offset_of_line,
};
pub use selection::TextRange;
pub use utf16::{byte_to_utf16, utf16_len, utf16_to_byte};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Path has no file name: {0}")]
    InvalidPath(std::path::PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_utf16(), 0);
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("Hello, World!");
        assert_eq!(buffer.len_utf16(), 13);
        assert_eq!(buffer.text(), "Hello, World!");
    }

    #[test]
    fn test_replace_by_utf16_range() {
        let mut buffer = TextBuffer::from("Hello World");
        buffer.replace_utf16(TextRange::new(5, 1), ", ");
        assert_eq!(buffer.text(), "Hello, World");

        buffer.replace_utf16(TextRange::caret(0), ">> ");
        assert_eq!(buffer.text(), ">> Hello, World");
    }

    #[test]
    fn test_line_operations() {
        let buffer = TextBuffer::from("Line 1\nLine 2\nLine 3");
        assert_eq!(buffer.offset_of_line(3), 14);
        assert_eq!(buffer.line_column(14), Position::new(3, 1));
    }
}
