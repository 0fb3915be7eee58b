//! Word completion.
//!
//! Suggestions are recomputed from scratch on every query: the language's
//! keywords, every identifier-like word in the document and the base names
//! of the workspace's files. Nothing is cached between calls.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use balenciaga_buffer::{TextRange, identifier_prefix_range};
use balenciaga_core::Language;
use balenciaga_core::config::CompletionConfig;
use regex::Regex;
use serde::Serialize;

/// Default cap on returned suggestions.
pub const MAX_SUGGESTIONS: usize = 25;

/// Detail tag on every suggestion.
pub const SYMBOL_DETAIL: &str = "symbol";

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| crate::compile(r"\b[_a-zA-Z][_a-zA-Z0-9]{2,}\b"));

/// One suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CompletionItem {
    /// Text shown in the list
    pub label: String,
    /// Text that replaces the prefix
    pub insert_text: String,
    pub detail: String,
}

impl CompletionItem {
    fn symbol(word: &str) -> Self {
        Self {
            label: word.to_string(),
            insert_text: word.to_string(),
            detail: SYMBOL_DETAIL.to_string(),
        }
    }
}

/// Produces ranked suggestions for the word under the cursor.
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    max_results: usize,
}

impl CompletionEngine {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    pub fn from_config(config: &CompletionConfig) -> Self {
        Self::new(config.max_results)
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Returns suggestions for the word ending at the selection's start.
    ///
    /// An empty prefix gives nothing, so typing between tokens stays quiet.
    /// Candidates equal to the prefix (ignoring case) are left out.
    pub fn suggestions(
        &self,
        text: &str,
        selection: TextRange,
        language: Language,
        workspace_names: &[String],
    ) -> Vec<CompletionItem> {
        let prefix = completion_prefix(text, selection);
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut candidates: BTreeSet<&str> = keywords(language).iter().copied().collect();
        candidates.extend(identifiers(text));
        candidates.extend(workspace_names.iter().map(String::as_str));

        let prefix = prefix.to_lowercase();
        candidates
            .into_iter()
            .filter(|candidate| {
                let lower = candidate.to_lowercase();
                lower.starts_with(&prefix) && lower != prefix
            })
            .take(self.max_results)
            .map(CompletionItem::symbol)
            .collect()
    }
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new(MAX_SUGGESTIONS)
    }
}

/// Returns the identifier characters just before the cursor.
pub fn completion_prefix(text: &str, selection: TextRange) -> &str {
    let range = identifier_prefix_range(text, selection.location);
    let start = balenciaga_buffer::utf16_to_byte(text, range.location);
    let end = balenciaga_buffer::utf16_to_byte(text, range.end());
    text.get(start..end).unwrap_or("")
}

fn identifiers(text: &str) -> impl Iterator<Item = &str> {
    IDENTIFIER
        .as_ref()
        .into_iter()
        .flat_map(move |regex| regex.find_iter(text).map(|m| m.as_str()))
}

/// Fixed keyword list offered for `language`.
pub fn keywords(language: Language) -> &'static [&'static str] {
    match language {
        Language::Swift => &[
            "class", "struct", "enum", "func", "let", "var", "protocol", "extension", "guard",
            "defer", "switch", "case", "async", "await", "throws", "import", "return",
        ],
        Language::JavaScript | Language::TypeScript => &[
            "const", "let", "var", "function", "class", "extends", "async", "await", "import",
            "export", "interface", "type", "return", "switch", "case",
        ],
        Language::Python => &[
            "def", "class", "import", "from", "return", "async", "await", "yield", "for",
            "while", "try", "except", "with", "lambda",
        ],
        Language::Json => &["true", "false", "null"],
        Language::Markdown => &["#", "##", "###", "```", "-", "*"],
        Language::Html => &[
            "div", "span", "section", "article", "header", "footer", "main", "script", "style",
        ],
        Language::Css => &[
            "display", "position", "grid", "flex", "gap", "padding", "margin", "color",
            "background",
        ],
        Language::Shell => &[
            "if", "then", "else", "fi", "for", "while", "do", "done", "case", "esac", "function",
        ],
        Language::Plain => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    fn at_end(text: &str) -> TextRange {
        TextRange::caret(balenciaga_buffer::utf16_len(text))
    }

    #[test]
    fn test_prefix_at_cursor() {
        let text = "let sampleValue = samp";
        assert_eq!(completion_prefix(text, at_end(text)), "samp");
        assert_eq!(completion_prefix(text, TextRange::caret(3)), "let");
        assert_eq!(completion_prefix(text, TextRange::caret(4)), "");
        assert_eq!(completion_prefix(text, TextRange::caret(500)), "samp");
    }

    #[test]
    fn test_prefix_after_non_ascii() {
        let text = "café_x";
        assert_eq!(completion_prefix(text, at_end(text)), "_x");
    }

    #[test]
    fn test_prefix_empty_inside_surrogate_pair() {
        assert_eq!(completion_prefix("ab😀", TextRange::caret(3)), "");
        assert!(
            CompletionEngine::default()
                .suggestions("abacus ab😀", TextRange::caret(10), Language::Plain, &[])
                .is_empty()
        );
    }

    #[test]
    fn test_suggests_document_identifiers() {
        let engine = CompletionEngine::default();
        let text = "let sampleValue = samp";
        let items = engine.suggestions(text, at_end(text), Language::Swift, &[]);
        assert_eq!(labels(&items), ["sampleValue"]);
        assert_eq!(items[0].insert_text, "sampleValue");
        assert_eq!(items[0].detail, "symbol");
    }

    #[test]
    fn test_empty_prefix_gives_nothing() {
        let engine = CompletionEngine::default();
        let text = "totalRevenue ";
        assert!(engine
            .suggestions(text, at_end(text), Language::Swift, &[])
            .is_empty());
    }

    #[test]
    fn test_excludes_exact_match_and_sorts() {
        let engine = CompletionEngine::default();
        let text = "Total totalRevenue totals tot";
        let items = engine.suggestions(text, at_end(text), Language::Plain, &[]);
        assert_eq!(labels(&items), ["Total", "totalRevenue", "totals"]);

        let text = "tot TOT";
        let items = engine.suggestions(text, at_end(text), Language::Plain, &[]);
        assert!(items.is_empty());
    }

    #[test]
    fn test_keywords_and_workspace_names() {
        let engine = CompletionEngine::default();
        let names = vec!["ContentView".to_string(), "README".to_string()];
        let text = "con";
        let items = engine.suggestions(text, at_end(text), Language::JavaScript, &names);
        assert_eq!(labels(&items), ["ContentView", "const"]);
    }

    #[test]
    fn test_short_words_are_not_identifiers() {
        let engine = CompletionEngine::default();
        let text = "ab abc a";
        let items = engine.suggestions(text, at_end(text), Language::Plain, &[]);
        assert_eq!(labels(&items), ["abc"]);
    }

    #[test]
    fn test_capped() {
        let engine = CompletionEngine::default();
        let mut text: String = (0..40).map(|i| format!("item{i:02} ")).collect();
        text.push_str("it");
        let items = engine.suggestions(&text, at_end(&text), Language::Plain, &[]);
        assert_eq!(items.len(), MAX_SUGGESTIONS);
        assert_eq!(items[0].label, "item00");
        assert_eq!(items[24].label, "item24");

        let small = CompletionEngine::new(3);
        assert_eq!(
            small
                .suggestions(&text, at_end(&text), Language::Plain, &[])
                .len(),
            3
        );
    }

    #[test]
    fn test_plain_has_no_keywords() {
        assert!(keywords(Language::Plain).is_empty());
        for language in Language::ALL {
            let words = keywords(language);
            let unique: BTreeSet<_> = words.iter().collect();
            assert_eq!(unique.len(), words.len(), "{language}");
        }
    }
}
