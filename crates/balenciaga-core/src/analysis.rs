//! Writing statistics and Markdown outline extraction.

use balenciaga_buffer::grapheme_count;
use serde::{Deserialize, Serialize};

/// Counts shown in the status bar and writing panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
    pub paragraphs: usize,
    pub reading_minutes: usize,
}

impl DocumentStats {
    /// Statistics of an empty document.
    pub const EMPTY: DocumentStats = DocumentStats {
        words: 0,
        characters: 0,
        paragraphs: 0,
        reading_minutes: 0,
    };

    /// Computes statistics for `text`.
    ///
    /// - words: maximal runs of letters, digits and `'`
    /// - characters: grapheme clusters
    /// - paragraphs: non-blank blocks separated by `"\n\n"`
    /// - reading time: `ceil(words / words_per_minute)`, at least 1 when
    ///   there is any word
    pub fn compute(text: &str, words_per_minute: usize) -> Self {
        let words = text
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|run| !run.is_empty())
            .count();
        let paragraphs = text
            .split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .count();
        let reading_minutes = if words == 0 {
            0
        } else {
            words.div_ceil(words_per_minute.max(1)).max(1)
        };

        Self {
            words,
            characters: grapheme_count(text),
            paragraphs,
            reading_minutes,
        }
    }
}

/// A Markdown heading found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeading {
    /// 1 for `#`, up to 6
    pub level: usize,
    pub title: String,
    /// 1-based line number
    pub line: usize,
}

/// Maximum heading depth.
const MAX_HEADING_LEVEL: usize = 6;

/// Scans `text` for ATX headings.
///
/// A line (after trimming) that starts with `#` contributes a heading when
/// something non-blank follows the run of hashes. Runs longer than six are
/// capped at level six, and only six hashes are stripped from the title.
pub fn outline_headings(text: &str) -> Vec<DocumentHeading> {
    text.split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            let hashes = trimmed.bytes().take_while(|b| *b == b'#').count();
            if hashes == 0 {
                return None;
            }
            let level = hashes.min(MAX_HEADING_LEVEL);
            let title = trimmed[level..].trim();
            if title.is_empty() {
                return None;
            }
            Some(DocumentHeading {
                level,
                title: title.to_string(),
                line: index + 1,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# First\n\nParagraph one words here.\n\n## Second\nMore text";

    #[test]
    fn test_empty_statistics() {
        assert_eq!(DocumentStats::compute("", 220), DocumentStats::EMPTY);
        assert_eq!(DocumentStats::compute("  \n\n ", 220).paragraphs, 0);
    }

    #[test]
    fn test_sample_statistics() {
        let stats = DocumentStats::compute(SAMPLE, 220);
        assert_eq!(stats.words, 8);
        assert_eq!(stats.paragraphs, 3);
        assert_eq!(stats.reading_minutes, 1);
        assert_eq!(stats.characters, SAMPLE.chars().count());
    }

    #[test]
    fn test_apostrophes_join_words() {
        let stats = DocumentStats::compute("don't stop-me now", 220);
        assert_eq!(stats.words, 4);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let text = "word ".repeat(221);
        assert_eq!(DocumentStats::compute(&text, 220).reading_minutes, 2);
        let text = "word ".repeat(220);
        assert_eq!(DocumentStats::compute(&text, 220).reading_minutes, 1);
    }

    #[test]
    fn test_outline() {
        let headings = outline_headings(SAMPLE);
        assert_eq!(
            headings,
            vec![
                DocumentHeading {
                    level: 1,
                    title: "First".to_string(),
                    line: 1
                },
                DocumentHeading {
                    level: 2,
                    title: "Second".to_string(),
                    line: 5
                },
            ]
        );
    }

    #[test]
    fn test_outline_skips_empty_and_caps_level() {
        let headings = outline_headings("#\n  ### Indented  \n####### Deep");
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].level, 3);
        assert_eq!(headings[0].title, "Indented");
        assert_eq!(headings[1].level, 6);
        assert_eq!(headings[1].title, "# Deep");
    }
}
