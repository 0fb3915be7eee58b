//! Core text buffer implementation using rope data structure.
//!
//! ## Why Rope?
//!
//! Every keystroke and every formatting command replaces a range of the
//! document. A rope keeps those replacements cheap on large files, while
//! reads hand out a `Cow<str>` that borrows when the text fits in one chunk.
//!
//! Ropey indexes by `char`; the editor indexes by UTF-16 unit. All public
//! methods here take UTF-16 offsets and translate at the edge.

use ropey::Rope;
use std::borrow::Cow;
use std::path::Path;

use crate::position::{self, Position};
use crate::selection::TextRange;
use crate::{BufferError, BufferResult};

/// A text buffer backed by a rope, addressed in UTF-16 code units.
///
/// # Thread Safety
///
/// `TextBuffer` is `Send` but not `Sync` in spirit: the document store owns
/// it exclusively, and readers work on `text()` snapshots.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    /// The rope holding our text content
    rope: Rope,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use balenciaga_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Loads a buffer from a file.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
    /// failing the load.
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(Self::from(content.as_ref()))
    }

    /// Writes the buffer to `path` atomically.
    ///
    /// The text goes to a sibling temporary file first and is then renamed
    /// over the destination, so a failed write never truncates the target.
    pub fn write_to(&self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| BufferError::InvalidPath(path.to_path_buf()))?;

        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".saving");
        let temp_path = path.with_file_name(temp_name);

        std::fs::write(&temp_path, self.text().as_bytes())?;
        if let Err(err) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }

    // ==================== Text Access ====================

    /// Returns the entire text content as a `Cow<str>`.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Replaces the whole content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Returns the text covered by `range`, clamped to the buffer.
    pub fn slice_utf16(&self, range: TextRange) -> String {
        let range = self.clamp(range);
        let start = self.rope.utf16_cu_to_char(range.location);
        let end = self.rope.utf16_cu_to_char(range.end());
        self.rope.slice(start..end).into()
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the length in UTF-16 code units.
    #[inline]
    pub fn len_utf16(&self) -> usize {
        self.rope.len_utf16_cu()
    }

    /// Returns the number of bytes in the buffer.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Counts user-perceived characters.
    pub fn grapheme_count(&self) -> usize {
        position::grapheme_count(&self.text())
    }

    /// Clamps a range to the current length.
    #[inline]
    pub fn clamp(&self, range: TextRange) -> TextRange {
        range.clamped(self.len_utf16())
    }

    // ==================== Mutations ====================

    /// Replaces the text in `range` with `text`.
    ///
    /// The range is clamped first. Returns the range that was actually
    /// replaced.
    pub fn replace_utf16(&mut self, range: TextRange, text: &str) -> TextRange {
        let range = self.clamp(range);
        let start = self.rope.utf16_cu_to_char(range.location);
        let end = self.rope.utf16_cu_to_char(range.end());
        if end > start {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
        range
    }

    // ==================== Line Queries ====================

    /// Resolves an offset into a 1-based line and column.
    pub fn line_column(&self, offset: usize) -> Position {
        position::line_column(&self.text(), offset)
    }

    /// Returns the offset at which 1-based `line` starts.
    pub fn offset_of_line(&self, line: usize) -> usize {
        position::offset_of_line(&self.text(), line)
    }

    /// Expands `range` to whole lines.
    pub fn line_range(&self, range: TextRange) -> TextRange {
        position::line_range(&self.text(), range)
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_clamps_stale_range() {
        let mut buffer = TextBuffer::from("abc");
        let replaced = buffer.replace_utf16(TextRange::new(2, 10), "Z");
        assert_eq!(replaced, TextRange::new(2, 1));
        assert_eq!(buffer.text(), "abZ");
    }

    #[test]
    fn test_slice_with_surrogates() {
        let buffer = TextBuffer::from("a😀b");
        assert_eq!(buffer.len_utf16(), 4);
        assert_eq!(buffer.slice_utf16(TextRange::new(1, 2)), "😀");
    }

    #[test]
    fn test_lossy_load_and_atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, b"ok \xff done").unwrap();

        let buffer = TextBuffer::from_file(&path).unwrap();
        assert_eq!(buffer.text(), "ok \u{FFFD} done");

        let buffer = TextBuffer::from("rewritten");
        buffer.write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "rewritten");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = TextBuffer::from("x");
        assert!(buffer.write_to(dir.path().join("missing/out.txt")).is_err());
    }
}
