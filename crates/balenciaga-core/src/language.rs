//! Language tags.
//!
//! The tag drives keyword completion, syntax highlighting and which
//! external checker the diagnostics engine runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The languages the editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Plain,
    Swift,
    JavaScript,
    TypeScript,
    Json,
    Markdown,
    Html,
    Css,
    Python,
    Shell,
}

impl Language {
    /// Every language, in declaration order.
    pub const ALL: [Language; 10] = [
        Language::Plain,
        Language::Swift,
        Language::JavaScript,
        Language::TypeScript,
        Language::Json,
        Language::Markdown,
        Language::Html,
        Language::Css,
        Language::Python,
        Language::Shell,
    ];

    /// Detects the language from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Detects the language from a bare extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "swift" => Language::Swift,
            "js" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "json" => Language::Json,
            "md" | "markdown" => Language::Markdown,
            "html" | "htm" => Language::Html,
            "css" => Language::Css,
            "py" => Language::Python,
            "sh" | "zsh" | "bash" => Language::Shell,
            _ => Language::Plain,
        }
    }

    /// Returns the canonical identifier, e.g. `"typescript"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Plain => "plain",
            Language::Swift => "swift",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Html => "html",
            Language::Css => "css",
            Language::Python => "python",
            Language::Shell => "shell",
        }
    }

    /// Returns the usual file extension for source files in this language.
    pub fn default_extension(&self) -> &'static str {
        match self {
            Language::Plain => "txt",
            Language::Swift => "swift",
            Language::JavaScript => "js",
            Language::TypeScript => "ts",
            Language::Json => "json",
            Language::Markdown => "md",
            Language::Html => "html",
            Language::Css => "css",
            Language::Python => "py",
            Language::Shell => "sh",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown language: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_path() {
        assert_eq!(Language::from_path("Sources/main.swift"), Language::Swift);
        assert_eq!(Language::from_path("README.MD"), Language::Markdown);
        assert_eq!(Language::from_path("index.htm"), Language::Html);
        assert_eq!(Language::from_path("run.zsh"), Language::Shell);
        assert_eq!(Language::from_path("Makefile"), Language::Plain);
        assert_eq!(Language::from_path("lib.rs"), Language::Plain);
    }

    #[test]
    fn test_parse_name() {
        assert_eq!("TypeScript".parse::<Language>(), Ok(Language::TypeScript));
        assert!("cobol".parse::<Language>().is_err());
    }
}
