//! # Balenciaga Tools
//!
//! The read-only services that sit beside the document store: completion,
//! diagnostics and git. They take `&str` snapshots of a document, never
//! the store itself, so they can run on a background task while the
//! editor keeps accepting edits.
//!
//! ## Learning: async Subprocesses
//!
//! Compilers and git can take seconds. Each invocation goes through
//! [`ShellExecutor`], which `ProcessShell` implements on
//! `tokio::process::Command` with a timeout. A hung tool is killed rather
//! than waited on forever.
//!
//! ```text
//! Editor ──snapshot──► DiagnosticsEngine ──argv──► ShellExecutor ──► swiftc / tsc / git
//!                                ◄── Vec<DiagnosticItem> ──┘
//! ```

pub mod completion;
pub mod diagnostics;
pub mod git;
pub mod lsp;
pub mod shell;

pub use completion::{CompletionEngine, CompletionItem};
pub use diagnostics::{DiagnosticItem, DiagnosticsEngine, Severity};
pub use git::{GitFileStatus, GitStatusService};
pub use shell::{ProcessShell, ShellError, ShellExecutor, ShellOutput};

// Re-export LSP types
pub use lsp_types;

use regex::Regex;

/// Compiles a built-in pattern, logging instead of panicking if it is bad.
pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::error!(pattern, error = %err, "invalid built-in pattern");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile() {
        assert!(compile(r"\b\w+\b").is_some());
        assert!(compile("(unclosed").is_none());
    }
}
