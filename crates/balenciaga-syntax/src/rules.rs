//! Regex rule sets.
//!
//! Each rule is a pattern plus the capture group that gets highlighted
//! (0 for the whole match). The `regex` crate has no look-around, so rules
//! that only colour part of a match ("a JSON key followed by `:`") capture
//! the part they colour.

use std::sync::LazyLock;

use balenciaga_core::Language;
use regex::Regex;

use crate::{HighlightKind, HighlightSpan};

/// One highlighting rule.
#[derive(Debug)]
pub struct Rule {
    regex: Regex,
    group: usize,
    kind: HighlightKind,
}

impl Rule {
    fn new(pattern: &str, group: usize, kind: HighlightKind) -> Option<Self> {
        match Regex::new(pattern) {
            Ok(regex) => Some(Self { regex, group, kind }),
            Err(err) => {
                tracing::error!(pattern, error = %err, "invalid highlight rule");
                None
            }
        }
    }
}

/// Ordered rules for one language.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    fn new(rules: impl IntoIterator<Item = Option<Rule>>) -> Self {
        Self {
            rules: rules.into_iter().flatten().collect(),
        }
    }

    /// Returns the shared rule set for `language`.
    pub fn for_language(language: Language) -> &'static RuleSet {
        match language {
            Language::Swift => &SWIFT,
            Language::JavaScript | Language::TypeScript => &SCRIPT,
            Language::Json => &JSON,
            Language::Markdown => &MARKDOWN,
            Language::Html | Language::Css => &MARKUP,
            Language::Python => &PYTHON,
            Language::Shell => &SHELL,
            Language::Plain => &PLAIN,
        }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule over `source`, in rule order.
    pub fn apply(&self, source: &str) -> Vec<HighlightSpan> {
        let mut spans = Vec::new();
        for rule in &self.rules {
            for captures in rule.regex.captures_iter(source) {
                if let Some(m) = captures.get(rule.group) {
                    if !m.is_empty() {
                        spans.push(HighlightSpan {
                            start: m.start(),
                            end: m.end(),
                            kind: rule.kind,
                        });
                    }
                }
            }
        }
        spans
    }
}

// ==================== Shared Rules ====================

const SLASH_COMMENT: &str = r"//.*|(?s:/\*.*?\*/)";
const HASH_COMMENT: &str = r"#.*";
const STRING: &str = r#""(\\.|[^"\\])*"|'(\\.|[^'\\])*'"#;
const NUMBER: &str = r"\b[0-9]+(\.[0-9]+)?\b";

fn keywords(words: &[&str]) -> Option<Rule> {
    Rule::new(
        &format!(r"\b({})\b", words.join("|")),
        0,
        HighlightKind::Keyword,
    )
}

fn rule(pattern: &str, kind: HighlightKind) -> Option<Rule> {
    Rule::new(pattern, 0, kind)
}

// ==================== Language Rule Sets ====================

static PLAIN: LazyLock<RuleSet> = LazyLock::new(RuleSet::default);

static SWIFT: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new([
        rule(SLASH_COMMENT, HighlightKind::Comment),
        rule(STRING, HighlightKind::String),
        rule(NUMBER, HighlightKind::Number),
        keywords(&[
            "class", "struct", "enum", "protocol", "extension", "func", "let", "var", "if",
            "else", "guard", "for", "while", "return", "import", "switch", "case", "default",
            "break", "continue", "throw", "throws", "try", "catch", "defer", "in", "where",
            "as", "is", "do", "public", "private", "internal", "fileprivate", "open", "static",
            "final",
        ]),
    ])
});

static SCRIPT: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new([
        rule(SLASH_COMMENT, HighlightKind::Comment),
        rule(STRING, HighlightKind::String),
        rule(NUMBER, HighlightKind::Number),
        keywords(&[
            "const", "let", "var", "function", "class", "extends", "if", "else", "for",
            "while", "return", "import", "export", "from", "switch", "case", "break",
            "continue", "try", "catch", "finally", "new", "this", "super", "throw", "async",
            "await", "type", "interface",
        ]),
    ])
});

static JSON: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new([
        rule(STRING, HighlightKind::String),
        rule(NUMBER, HighlightKind::Number),
        Rule::new(r#"("(\\.|[^"\\])*")\s*:"#, 1, HighlightKind::Property),
    ])
});

static MARKDOWN: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new([
        rule(r"(?m)^#{1,6}\s.*$", HighlightKind::Heading),
        rule(r"\*\*.*?\*\*|__.*?__", HighlightKind::Emphasis),
        rule(r"`{1,3}[^`]*`{1,3}", HighlightKind::Code),
    ])
});

static MARKUP: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new([
        rule(SLASH_COMMENT, HighlightKind::Comment),
        rule(STRING, HighlightKind::String),
        rule(NUMBER, HighlightKind::Number),
        rule(r"</?\w+[^>]*>", HighlightKind::Tag),
        Rule::new(r"\b([a-zA-Z-]+)=", 1, HighlightKind::Attribute),
    ])
});

static PYTHON: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new([
        rule(HASH_COMMENT, HighlightKind::Comment),
        rule(STRING, HighlightKind::String),
        rule(NUMBER, HighlightKind::Number),
        keywords(&[
            "def", "class", "import", "from", "as", "if", "elif", "else", "for", "while",
            "return", "try", "except", "finally", "with", "lambda", "pass", "break",
            "continue", "raise", "yield", "in", "is", "not", "and", "or",
        ]),
    ])
});

static SHELL: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new([
        rule(HASH_COMMENT, HighlightKind::Comment),
        rule(STRING, HighlightKind::String),
        rule(NUMBER, HighlightKind::Number),
    ])
});
