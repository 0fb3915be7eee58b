//! Selection ranges.
//!
//! A `TextRange` is the location/length pair a native text view reports
//! for its selection. Both fields count UTF-16 code units.
//!
//! Ranges handed over by a UI widget can be stale: the widget may still
//! hold a selection from before a programmatic edit shortened the text.
//! Always run a range through [`TextRange::clamped`] before slicing.

use serde::{Deserialize, Serialize};

/// A range of text, measured in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    /// Offset of the first unit
    pub location: usize,
    /// Number of units covered
    pub length: usize,
}

impl TextRange {
    /// Creates a new range.
    pub fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// An empty range (a caret) at `location`.
    pub fn caret(location: usize) -> Self {
        Self {
            location,
            length: 0,
        }
    }

    /// Offset one past the last unit.
    #[inline]
    pub fn end(&self) -> usize {
        self.location.saturating_add(self.length)
    }

    /// Returns true if nothing is selected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Clamps the range so it lies within a text of `len` units.
    pub fn clamped(self, len: usize) -> Self {
        let location = self.location.min(len);
        let length = self.length.min(len - location);
        Self { location, length }
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}, {}}}", self.location, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_stale_selection() {
        let range = TextRange::new(10, 5);
        assert_eq!(range.clamped(12), TextRange::new(10, 2));
        assert_eq!(range.clamped(4), TextRange::new(4, 0));
    }

    #[test]
    fn test_caret() {
        let caret = TextRange::caret(3);
        assert!(caret.is_empty());
        assert_eq!(caret.end(), 3);
    }
}
