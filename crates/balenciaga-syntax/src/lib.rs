//! # Balenciaga Syntax
//!
//! Syntax highlighting spans for the editor's languages.
//!
//! ## Two Strategies
//!
//! - **Tree-sitter** for JavaScript, TypeScript, Python and JSON: real
//!   parsing, error-tolerant, incremental re-parses.
//! - **Regex rule sets** for Swift, Markdown, HTML/CSS and Shell, which
//!   have no bundled grammar. Rules run in order and later matches refine
//!   earlier ones, the way attributes layer in a text view.
//!
//! If a tree-sitter parse fails, the language's rule set is used instead,
//! so every language except plain text always gets some colour.
//!
//! ## Learning: FFI (Foreign Function Interface)
//!
//! Tree-sitter is written in C. The `tree-sitter` crate wraps the C API in
//! safe Rust types (`Parser`, `Tree`, `Node`); grammar crates export a
//! `LANGUAGE` constant that converts into `tree_sitter::Language`.

pub mod rules;
pub mod tree;

pub use rules::RuleSet;
pub use tree::Highlighter;

use balenciaga_core::Language;
use tracing::warn;

/// Errors that can occur during syntax highlighting.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("No grammar for language: {0}")]
    UnknownLanguage(Language),

    #[error("Parser error")]
    ParseError,
}

/// Result type for syntax operations
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// A highlighted span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
    /// Kind of syntax element
    pub kind: HighlightKind,
}

impl HighlightSpan {
    /// Returns the highlighted text.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// Types of syntax elements for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Keyword,
    String,
    Number,
    Comment,
    Function,
    Type,
    Constant,
    Property,
    Attribute,
    Tag,
    Heading,
    Emphasis,
    Code,
}

impl HighlightKind {
    /// Returns the theme color key for this kind.
    pub fn theme_key(&self) -> &'static str {
        match self {
            HighlightKind::Keyword => "keyword",
            HighlightKind::String => "string",
            HighlightKind::Number => "number",
            HighlightKind::Comment => "comment",
            HighlightKind::Function => "function",
            HighlightKind::Type => "type_name",
            HighlightKind::Constant => "constant",
            HighlightKind::Property => "property",
            HighlightKind::Attribute => "attribute",
            HighlightKind::Tag => "tag",
            HighlightKind::Heading => "heading",
            HighlightKind::Emphasis => "strong",
            HighlightKind::Code => "string",
        }
    }
}

/// Returns true if `language` is parsed with tree-sitter.
pub fn has_grammar(language: Language) -> bool {
    matches!(
        language,
        Language::JavaScript | Language::TypeScript | Language::Python | Language::Json
    )
}

/// Highlights `source`, ordered by start offset.
///
/// Plain text yields no spans.
pub fn highlight(language: Language, source: &str) -> Vec<HighlightSpan> {
    let mut spans = if has_grammar(language) {
        match Highlighter::new(language).and_then(|mut h| {
            h.parse(source)?;
            Ok(h.highlight())
        }) {
            Ok(spans) => spans,
            Err(err) => {
                warn!(%language, error = %err, "tree-sitter failed, using rule set");
                RuleSet::for_language(language).apply(source)
            }
        }
    } else {
        RuleSet::for_language(language).apply(source)
    };

    spans.sort_by_key(|span| span.start);
    spans
}
