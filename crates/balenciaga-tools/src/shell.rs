//! Running external programs.
//!
//! ## Learning: Traits at the Process Boundary
//!
//! Diagnostics and git only need "run this argv, give me the exit code and
//! output". Putting that behind [`ShellExecutor`] lets tests script the
//! answers instead of needing `git` or `swiftc` on the machine.
//!
//! The trait method returns `impl Future + Send`, so implementations can be
//! written as plain `async fn` and the futures can still move between
//! worker threads.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

/// Default limit on how long a tool may run.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit code shells use for "command not found".
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Errors from launching or waiting on a process.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit code, or -1 when the process was ended by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ShellOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the process exited with 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stderr followed by stdout, the order compilers report in.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stderr, self.stdout)
    }
}

/// Something that can run a command line.
pub trait ShellExecutor: Send + Sync {
    /// Runs `argv[0]` with the remaining arguments, optionally in `cwd`.
    fn run(
        &self,
        argv: &[String],
        cwd: Option<&Path>,
    ) -> impl Future<Output = Result<ShellOutput, ShellError>> + Send;
}

/// Runs commands as child processes with a timeout.
///
/// The child is killed if the timeout fires or the future is dropped.
#[derive(Debug, Clone)]
pub struct ProcessShell {
    timeout: Duration,
}

impl ProcessShell {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ProcessShell {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_TIMEOUT)
    }
}

impl ShellExecutor for ProcessShell {
    async fn run(&self, argv: &[String], cwd: Option<&Path>) -> Result<ShellOutput, ShellError> {
        let (program, args) = argv.split_first().ok_or(ShellError::EmptyCommand)?;

        debug!(?argv, ?cwd, "running tool");
        let child = command(program, args, cwd).spawn().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ShellError::NotFound(program.clone())
            } else {
                ShellError::Spawn {
                    program: program.clone(),
                    source,
                }
            }
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ShellError::Spawn {
                program: program.clone(),
                source,
            })?,
            Err(_) => {
                warn!(%program, timeout = ?self.timeout, "tool timed out, killed");
                return Err(ShellError::Timeout {
                    program: program.clone(),
                    after: self.timeout,
                });
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(%program, exit_code, "tool finished");
        Ok(ShellOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn command(program: &str, args: &[String], cwd: Option<&Path>) -> Command {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }
    command
}

/// Builds an owned argv from string slices.
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_command() {
        let shell = ProcessShell::default();
        assert!(matches!(
            shell.run(&[], None).await,
            Err(ShellError::EmptyCommand)
        ));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let shell = ProcessShell::default();
        let result = shell
            .run(&argv(["balenciaga-no-such-tool", "--version"]), None)
            .await;
        assert!(matches!(result, Err(ShellError::NotFound(p)) if p == "balenciaga-no-such-tool"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_exit_code_and_streams() {
        let shell = ProcessShell::default();
        let output = shell
            .run(&argv(["sh", "-c", "echo out; echo err >&2; exit 3"]), None)
            .await
            .unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(!output.success());
        assert_eq!(output.combined(), "err\n\nout\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_cwd() {
        let dir = std::env::temp_dir().canonicalize().unwrap();
        let shell = ProcessShell::default();
        let output = shell.run(&argv(["pwd", "-P"]), Some(&dir)).await.unwrap();
        assert_eq!(output.stdout.trim(), dir.to_string_lossy());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_process() {
        let shell = ProcessShell::new(Duration::from_millis(100));
        let started = std::time::Instant::now();
        let result = shell.run(&argv(["sleep", "5"]), None).await;
        assert!(matches!(result, Err(ShellError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
