//! Git status and diffs for the workspace.
//!
//! Everything goes through the `git` binary. A failed invocation is never
//! an error here: no repository, git not installed and a broken index all
//! read as "no changes".

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::shell::{ProcessShell, ShellExecutor, ShellOutput, argv};

/// Returned by [`GitStatusService::diff`] for untracked files.
pub const UNTRACKED_MESSAGE: &str = "Untracked file. Stage it to view full diff output.";

/// Returned by [`GitStatusService::diff`] when git has nothing to say.
pub const NO_DIFF_MESSAGE: &str = "No diff available.";

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitFileStatus {
    /// Index status (`X` column)
    pub staged_code: char,
    /// Work tree status (`Y` column)
    pub unstaged_code: char,
    /// Repository-relative path
    pub path: String,
}

impl GitFileStatus {
    /// Both codes with blanks shown as `-`, e.g. `"A-"`, `"-M"`, `"??"`.
    pub fn display_code(&self) -> String {
        [self.staged_code, self.unstaged_code]
            .iter()
            .map(|&code| if code == ' ' { '-' } else { code })
            .collect()
    }

    pub fn is_untracked(&self) -> bool {
        self.staged_code == '?' && self.unstaged_code == '?'
    }
}

/// Parses porcelain v1 output, sorted by path.
///
/// Lines shorter than four characters are skipped.
pub fn parse_porcelain(output: &str) -> Vec<GitFileStatus> {
    let mut statuses: Vec<GitFileStatus> = output
        .split('\n')
        .filter_map(|line| {
            if line.chars().count() < 4 {
                return None;
            }
            let mut chars = line.chars();
            let staged_code = chars.next()?;
            let unstaged_code = chars.next()?;
            chars.next()?;
            Some(GitFileStatus {
                staged_code,
                unstaged_code,
                path: chars.as_str().trim().to_string(),
            })
        })
        .collect();
    statuses.sort_by(|a, b| a.path.cmp(&b.path));
    statuses
}

/// Queries git in a workspace.
#[derive(Debug, Clone)]
pub struct GitStatusService<S = ProcessShell> {
    shell: S,
}

impl GitStatusService {
    pub fn new() -> Self {
        Self::with_shell(ProcessShell::default())
    }
}

impl Default for GitStatusService {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ShellExecutor> GitStatusService<S> {
    pub fn with_shell(shell: S) -> Self {
        Self { shell }
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Returns true if `workspace` is inside a git work tree.
    pub async fn is_repository(&self, workspace: Option<&Path>) -> bool {
        let Some(workspace) = workspace else {
            return false;
        };
        self.git(workspace, &["rev-parse", "--is-inside-work-tree"])
            .await
            .success()
    }

    /// Returns changed files, or nothing if git fails.
    pub async fn status(&self, workspace: Option<&Path>) -> Vec<GitFileStatus> {
        let Some(workspace) = workspace else {
            return Vec::new();
        };
        let output = self.git(workspace, &["status", "--porcelain"]).await;
        if !output.success() {
            return Vec::new();
        }
        parse_porcelain(&output.stdout)
    }

    /// Returns the diff for `path`, unstaged changes first, then staged.
    pub async fn diff(&self, workspace: Option<&Path>, path: &str) -> String {
        let Some(root) = workspace else {
            return String::new();
        };

        let untracked = self
            .status(workspace)
            .await
            .iter()
            .find(|status| status.path == path)
            .is_some_and(GitFileStatus::is_untracked);
        if untracked {
            return UNTRACKED_MESSAGE.to_string();
        }

        let unstaged = self.git(root, &["diff", "--", path]).await;
        if has_content(&unstaged) {
            return unstaged.stdout;
        }

        let staged = self.git(root, &["diff", "--cached", "--", path]).await;
        if has_content(&staged) {
            return staged.stdout;
        }

        if unstaged.stderr.is_empty() {
            NO_DIFF_MESSAGE.to_string()
        } else {
            unstaged.stderr
        }
    }

    /// Runs git, folding launch failures into a failed output.
    async fn git(&self, workspace: &Path, args: &[&str]) -> ShellOutput {
        let argv = argv(std::iter::once("git").chain(args.iter().copied()));
        match self.shell.run(&argv, Some(workspace)).await {
            Ok(output) => output,
            Err(err) => {
                debug!(?args, error = %err, "git failed to run");
                ShellOutput::new(-1, "", err.to_string())
            }
        }
    }
}

fn has_content(output: &ShellOutput) -> bool {
    output.success() && !output.stdout.trim().is_empty()
}
