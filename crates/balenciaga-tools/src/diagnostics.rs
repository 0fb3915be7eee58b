//! Diagnostics for the open document.
//!
//! Three sources feed one list:
//!
//! 1. **Structural checks** that only count characters (bracket balance,
//!    trailing whitespace). These run for every language.
//! 2. **JSON parsing** through `serde_json`.
//! 3. **External toolchains** (`swiftc`, `node`, `tsc`, `python3`) run in
//!    check-only mode against a staged copy of the text.
//!
//! Nothing here returns an error. A tool that cannot be staged, launched or
//! finished in time becomes a warning in the list instead.
//!
//! ## Learning: RAII Temp Files
//!
//! The staged copy is a `tempfile::NamedTempFile`. Its `Drop` deletes the
//! file, so it is cleaned up on every path out of [`DiagnosticsEngine::diagnostics`],
//! including early returns and tool failures.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use balenciaga_buffer::{Position, grapheme_count};
use balenciaga_core::Language;
use balenciaga_core::config::DiagnosticsConfig;
use regex::Regex;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::shell::{EXIT_COMMAND_NOT_FOUND, ProcessShell, ShellError, ShellExecutor, ShellOutput};

/// File name prefix for staged copies.
pub const STAGE_PREFIX: &str = "balenciaga-lint-";

static COMPILER_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| crate::compile(r":(\d+):(\d+):\s+(error|warning|note):\s+(.+)"));

// ==================== Diagnostic Items ====================

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DiagnosticItem {
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl DiagnosticItem {
    pub fn new(severity: Severity, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            severity,
            line,
            column,
            message: message.into(),
        }
    }

    pub fn error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, line, column, message)
    }

    pub fn warning(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, line, column, message)
    }

    pub fn info(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, line, column, message)
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl std::fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.line, self.column, self.severity, self.message
        )
    }
}

// ==================== Engine ====================

/// A toolchain check for one language.
struct ToolCheck {
    label: &'static str,
    extension: String,
    command: &'static [&'static str],
    /// Tried when `command` is not installed
    fallback: Option<&'static [&'static str]>,
}

impl ToolCheck {
    fn for_language(language: Language, path: Option<&Path>) -> Option<Self> {
        let check = match language {
            Language::Swift => Self {
                label: "Swift",
                extension: path
                    .and_then(Path::extension)
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .filter(|ext| !ext.is_empty())
                    .unwrap_or_else(|| "swift".to_string()),
                command: &["swiftc", "-typecheck"],
                fallback: None,
            },
            Language::JavaScript => Self {
                label: "JS/TS",
                extension: "js".to_string(),
                command: &["node", "--check"],
                fallback: None,
            },
            Language::TypeScript => Self {
                label: "JS/TS",
                extension: "ts".to_string(),
                command: &["tsc", "--noEmit"],
                fallback: Some(&["node", "--check"]),
            },
            Language::Python => Self {
                label: "Python",
                extension: "py".to_string(),
                command: &["python3", "-m", "py_compile"],
                fallback: None,
            },
            _ => return None,
        };
        Some(check)
    }
}

fn argv_for(command: &[&str], staged: &Path) -> Vec<String> {
    command
        .iter()
        .map(|part| part.to_string())
        .chain(std::iter::once(staged.to_string_lossy().into_owned()))
        .collect()
}

fn tool_missing(result: &Result<ShellOutput, ShellError>) -> bool {
    match result {
        Ok(output) => output.exit_code == EXIT_COMMAND_NOT_FOUND,
        Err(ShellError::NotFound(_)) => true,
        Err(_) => false,
    }
}

/// Computes diagnostics for a document.
#[derive(Debug, Clone)]
pub struct DiagnosticsEngine<S = ProcessShell> {
    shell: S,
    external_tools: bool,
    staging_dir: Option<PathBuf>,
}

impl DiagnosticsEngine {
    /// Creates an engine that runs tools as child processes.
    pub fn new() -> Self {
        Self::with_shell(ProcessShell::default())
    }

    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self::with_shell(ProcessShell::new(config.tool_timeout()))
            .external_tools(config.external_tools)
    }
}

impl Default for DiagnosticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ShellExecutor> DiagnosticsEngine<S> {
    pub fn with_shell(shell: S) -> Self {
        Self {
            shell,
            external_tools: true,
            staging_dir: None,
        }
    }

    /// Enables or disables the toolchain checks.
    pub fn external_tools(mut self, enabled: bool) -> Self {
        self.external_tools = enabled;
        self
    }

    /// Stages copies in `dir` instead of the system temp directory.
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Returns deduplicated diagnostics sorted by line, then column.
    ///
    /// `path` is the document's file, if it has one; only its extension is
    /// used.
    pub async fn diagnostics(
        &self,
        text: &str,
        language: Language,
        path: Option<&Path>,
    ) -> Vec<DiagnosticItem> {
        let mut results = structural_diagnostics(text);

        if language == Language::Json {
            results.extend(json_diagnostics(text));
        } else if self.external_tools {
            if let Some(check) = ToolCheck::for_language(language, path) {
                results.extend(self.run_check(&check, text).await);
            }
        }

        sorted(deduplicated(results))
    }

    async fn run_check(&self, check: &ToolCheck, text: &str) -> Vec<DiagnosticItem> {
        let staged = match self.stage(text, &check.extension) {
            Ok(file) => file,
            Err(err) => {
                warn!(tool = check.label, error = %err, "failed to stage diagnostics input");
                return vec![DiagnosticItem::warning(
                    1,
                    1,
                    format!("Unable to stage {} diagnostics", check.label),
                )];
            }
        };
        let cwd = staged.path().parent();

        let mut result = self
            .shell
            .run(&argv_for(check.command, staged.path()), cwd)
            .await;
        if let Some(fallback) = check.fallback.filter(|_| tool_missing(&result)) {
            debug!(tool = check.command[0], "checker not installed, falling back");
            result = self.shell.run(&argv_for(fallback, staged.path()), cwd).await;
        }

        match result {
            Ok(output) if output.success() => Vec::new(),
            Ok(output) => parse_compiler_diagnostics(&output.combined()),
            Err(err) => {
                warn!(tool = check.label, error = %err, "diagnostics tool failed");
                vec![DiagnosticItem::warning(1, 1, err.to_string())]
            }
        }
    }

    fn stage(&self, text: &str, extension: &str) -> std::io::Result<NamedTempFile> {
        let suffix = format!(".{extension}");
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGE_PREFIX).suffix(&suffix);
        let mut file = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

// ==================== Checks ====================

/// Bracket balance and trailing whitespace.
pub fn structural_diagnostics(text: &str) -> Vec<DiagnosticItem> {
    const PAIRS: [(char, char, &str); 3] = [
        ('{', '}', "braces"),
        ('(', ')', "parentheses"),
        ('[', ']', "brackets"),
    ];

    let mut diagnostics = Vec::new();
    for (open, close, name) in PAIRS {
        let opened = text.chars().filter(|&c| c == open).count();
        let closed = text.chars().filter(|&c| c == close).count();
        if opened != closed {
            diagnostics.push(DiagnosticItem::warning(
                1,
                1,
                format!("Unbalanced {name} detected"),
            ));
        }
    }

    for (index, line) in text.split('\n').enumerate() {
        if line.ends_with([' ', '\t']) {
            diagnostics.push(DiagnosticItem::info(
                index + 1,
                grapheme_count(line).max(1),
                "Trailing whitespace",
            ));
        }
    }

    diagnostics
}

/// One error at (1, 1) unless `text` is a JSON object or array.
pub fn json_diagnostics(text: &str) -> Vec<DiagnosticItem> {
    let message = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(_) | serde_json::Value::Array(_)) => return Vec::new(),
        Ok(_) => "top-level value must be an object or array".to_string(),
        Err(err) => err.to_string(),
    };
    vec![DiagnosticItem::error(1, 1, format!("JSON: {message}"))]
}

/// Parses `file:line:col: severity: message` lines from tool output.
///
/// Output that has content but no such line becomes a single warning
/// carrying the trimmed output.
pub fn parse_compiler_diagnostics(output: &str) -> Vec<DiagnosticItem> {
    let mut diagnostics: Vec<DiagnosticItem> = COMPILER_LINE
        .as_ref()
        .map(|regex| {
            regex
                .captures_iter(output)
                .map(|caps| {
                    let severity = match &caps[3] {
                        "error" => Severity::Error,
                        "warning" => Severity::Warning,
                        _ => Severity::Info,
                    };
                    DiagnosticItem::new(
                        severity,
                        caps[1].parse().unwrap_or(1),
                        caps[2].parse().unwrap_or(1),
                        caps[4].trim(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let trimmed = output.trim();
    if diagnostics.is_empty() && !trimmed.is_empty() {
        diagnostics.push(DiagnosticItem::warning(1, 1, trimmed));
    }
    diagnostics
}

fn deduplicated(items: Vec<DiagnosticItem>) -> Vec<DiagnosticItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn sorted(mut items: Vec<DiagnosticItem>) -> Vec<DiagnosticItem> {
    items.sort_by_key(|item| (item.line, item.column));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::testing::ScriptedShell;

    fn messages(items: &[DiagnosticItem]) -> Vec<&str> {
        items.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_structural_braces_and_whitespace() {
        let items = structural_diagnostics("func x() {  \n");
        assert_eq!(
            items,
            vec![
                DiagnosticItem::warning(1, 1, "Unbalanced braces detected"),
                DiagnosticItem::info(1, 12, "Trailing whitespace"),
            ]
        );
    }

    #[test]
    fn test_structural_all_pairs() {
        let items = structural_diagnostics("(( [ {\nok\t\n\n");
        assert_eq!(
            messages(&items),
            [
                "Unbalanced braces detected",
                "Unbalanced parentheses detected",
                "Unbalanced brackets detected",
                "Trailing whitespace",
            ]
        );
        assert_eq!(items[3].position(), Position::new(2, 3));
        assert!(structural_diagnostics("fn main() { let a = [1]; }").is_empty());
    }

    #[test]
    fn test_trailing_whitespace_column_minimum() {
        let items = structural_diagnostics("a\n \nb");
        assert_eq!(items, vec![DiagnosticItem::info(2, 1, "Trailing whitespace")]);
    }

    #[test]
    fn test_json() {
        assert!(json_diagnostics(r#"{"a": [1, 2]}"#).is_empty());
        let items = json_diagnostics("{ invalid");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].severity, Severity::Error);
        assert_eq!(items[0].position(), Position::new(1, 1));
        assert!(items[0].message.starts_with("JSON: "));

        let scalar = json_diagnostics("42");
        assert_eq!(
            scalar[0].message,
            "JSON: top-level value must be an object or array"
        );
    }

    #[test]
    fn test_parse_compiler_line() {
        let items =
            parse_compiler_diagnostics("/tmp/file.swift:12:8: error: cannot find 'x' in scope");
        assert_eq!(
            items,
            vec![DiagnosticItem::error(12, 8, "cannot find 'x' in scope")]
        );
    }

    #[test]
    fn test_parse_compiler_severities() {
        let output = "\na.py:3:1: warning: unused  \nb.swift:4:2: note: declared here\n";
        let items = parse_compiler_diagnostics(output);
        assert_eq!(
            items,
            vec![
                DiagnosticItem::warning(3, 1, "unused"),
                DiagnosticItem::info(4, 2, "declared here"),
            ]
        );
    }

    #[test]
    fn test_parse_unmatched_output() {
        let items = parse_compiler_diagnostics("\n  SyntaxError: Unexpected token\n");
        assert_eq!(
            items,
            vec![DiagnosticItem::warning(1, 1, "SyntaxError: Unexpected token")]
        );
        assert!(parse_compiler_diagnostics(" \n\n").is_empty());
    }

    #[test]
    fn test_dedup_and_order() {
        let items = sorted(deduplicated(vec![
            DiagnosticItem::info(3, 1, "c"),
            DiagnosticItem::warning(1, 5, "b"),
            DiagnosticItem::warning(1, 5, "b"),
            DiagnosticItem::error(1, 5, "a"),
            DiagnosticItem::warning(1, 1, "first"),
        ]));
        assert_eq!(messages(&items), ["first", "b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_json_language() {
        let engine = DiagnosticsEngine::with_shell(ScriptedShell::new());
        let items = engine.diagnostics("{ invalid", Language::Json, None).await;
        assert!(items.iter().any(|d| d.severity == Severity::Error));
        assert!(engine.shell().calls().is_empty());
    }

    #[tokio::test]
    async fn test_plain_runs_no_tools() {
        let engine = DiagnosticsEngine::with_shell(ScriptedShell::new());
        let items = engine.diagnostics("[x  ", Language::Markdown, None).await;
        assert_eq!(
            messages(&items),
            ["Unbalanced brackets detected", "Trailing whitespace"]
        );
        assert!(engine.shell().calls().is_empty());
    }

    #[tokio::test]
    async fn test_swift_stages_and_cleans_up() {
        let shell = ScriptedShell::new().reply(
            1,
            "",
            "/tmp/x.swift:2:5: error: cannot find 'y' in scope\n",
        );
        let engine = DiagnosticsEngine::with_shell(shell);
        let text = "let x = 1\nlet z = y\n";
        let items = engine
            .diagnostics(text, Language::Swift, Some(Path::new("/work/App.swiftinterface")))
            .await;
        assert_eq!(
            items,
            vec![DiagnosticItem::error(2, 5, "cannot find 'y' in scope")]
        );

        let calls = engine.shell().calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(&call.argv[..2], ["swiftc", "-typecheck"]);
        let staged = Path::new(&call.argv[2]);
        let name = staged.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(STAGE_PREFIX));
        assert!(name.ends_with(".swiftinterface"));
        assert_eq!(call.cwd.as_deref(), staged.parent());
        assert_eq!(call.staged.as_deref(), Some(text));
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_successful_tool_adds_nothing() {
        let shell = ScriptedShell::new().reply(0, "", "ignored: 1:1: error: nope");
        let engine = DiagnosticsEngine::with_shell(shell);
        let items = engine
            .diagnostics("print('hi')\n", Language::Python, None)
            .await;
        assert!(items.is_empty());
        let calls = engine.shell().calls();
        assert_eq!(&calls[0].argv[..3], ["python3", "-m", "py_compile"]);
        assert!(calls[0].argv[3].ends_with(".py"));
    }

    #[tokio::test]
    async fn test_typescript_falls_back_to_node() {
        let shell = ScriptedShell::new()
            .reply(EXIT_COMMAND_NOT_FOUND, "", "env: tsc: No such file or directory")
            .reply(1, "", "file.ts:1:7: error: Unexpected token");
        let engine = DiagnosticsEngine::with_shell(shell);
        let items = engine
            .diagnostics("let x: = 1", Language::TypeScript, None)
            .await;
        assert_eq!(items, vec![DiagnosticItem::error(1, 7, "Unexpected token")]);

        let calls = engine.shell().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].argv[0], "tsc");
        assert_eq!(calls[1].argv[..2], ["node", "--check"]);
        assert_eq!(calls[0].argv[2], calls[1].argv[2]);
    }

    #[tokio::test]
    async fn test_typescript_missing_binary_falls_back() {
        let shell = ScriptedShell::new()
            .fail(ShellError::NotFound("tsc".into()))
            .reply(0, "", "");
        let engine = DiagnosticsEngine::with_shell(shell);
        assert!(
            engine
                .diagnostics("let x = 1", Language::TypeScript, None)
                .await
                .is_empty()
        );
        assert_eq!(engine.shell().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_javascript_has_no_fallback() {
        let shell = ScriptedShell::new().fail(ShellError::NotFound("node".into()));
        let engine = DiagnosticsEngine::with_shell(shell);
        let items = engine
            .diagnostics("let x = 1", Language::JavaScript, None)
            .await;
        assert_eq!(
            items,
            vec![DiagnosticItem::warning(1, 1, "Command not found: node")]
        );
        assert_eq!(engine.shell().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_staging_failure_is_a_warning() {
        let dir = std::env::temp_dir().join("balenciaga-missing-staging-dir");
        let engine = DiagnosticsEngine::with_shell(ScriptedShell::new()).staging_dir(dir);
        let items = engine
            .diagnostics("let x = 1 {", Language::Swift, None)
            .await;
        assert_eq!(
            items,
            vec![
                DiagnosticItem::warning(1, 1, "Unbalanced braces detected"),
                DiagnosticItem::warning(1, 1, "Unable to stage Swift diagnostics"),
            ]
        );
        assert!(engine.shell().calls().is_empty());
    }

    #[tokio::test]
    async fn test_external_tools_disabled() {
        let engine = DiagnosticsEngine::with_shell(ScriptedShell::new()).external_tools(false);
        assert!(
            engine
                .diagnostics("def f(:\n", Language::Python, None)
                .await
                .iter()
                .all(|d| d.message.starts_with("Unbalanced"))
        );
        assert!(engine.shell().calls().is_empty());
    }

    #[tokio::test]
    async fn test_tool_output_merged_with_structural() {
        let shell = ScriptedShell::new().reply(1, "", "x.js:1:1: error: bad\nx.js:1:1: error: bad");
        let engine = DiagnosticsEngine::with_shell(shell);
        let items = engine
            .diagnostics("f(  \n", Language::JavaScript, None)
            .await;
        assert_eq!(
            items,
            vec![
                DiagnosticItem::warning(1, 1, "Unbalanced parentheses detected"),
                DiagnosticItem::error(1, 1, "bad"),
                DiagnosticItem::info(1, 4, "Trailing whitespace"),
            ]
        );
    }
}
