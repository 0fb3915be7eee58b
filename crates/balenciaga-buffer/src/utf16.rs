//! Conversions between UTF-16 code-unit offsets and UTF-8 byte offsets.

/// Returns the length of `text` in UTF-16 code units.
#[inline]
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Converts a UTF-16 offset into a byte offset into `text`.
///
/// Offsets past the end clamp to `text.len()`. An offset that lands between
/// the two halves of a surrogate pair snaps back to the start of that
/// character, so the result is always a valid char boundary.
pub fn utf16_to_byte(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        if units >= offset {
            return idx;
        }
        let next = units + ch.len_utf16();
        if next > offset {
            return idx;
        }
        units = next;
    }
    text.len()
}

/// Converts a byte offset into a UTF-16 offset.
///
/// Byte offsets inside a multi-byte character round down to its start.
pub fn byte_to_utf16(text: &str, byte: usize) -> usize {
    let mut byte = byte.min(text.len());
    while !text.is_char_boundary(byte) {
        byte -= 1;
    }
    utf16_len(&text[..byte])
}
