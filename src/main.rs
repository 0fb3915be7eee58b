//! # Balenciaga
//!
//! Command-line front end for the Balenciaga editor engine. Each
//! subcommand loads a file or workspace into an [`Editor`] and runs one
//! engine operation against it, the same calls a GUI would make.
//!
//! ## Quick Start
//!
//! ```bash
//! # Check a file with the structural checks and its language's toolchain
//! cargo run -- diagnose src/App.swift
//!
//! # Complete the word ending at UTF-16 offset 120
//! cargo run -- complete notes.md --offset 120 --workspace .
//!
//! # Show git changes for the current directory
//! cargo run -- git-status
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use balenciaga_core::{Config, Editor, FileNode, Language, TextRange};
use balenciaga_tools::{
    CompletionEngine, DiagnosticsEngine, GitStatusService, ProcessShell,
};

/// Balenciaga - editor engine for writing and code
#[derive(Parser, Debug)]
#[command(name = "balenciaga")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Report diagnostics for a file
    Diagnose {
        file: PathBuf,

        /// Check as this language instead of the one implied by the extension
        #[arg(short, long)]
        language: Option<Language>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest completions for the word before an offset
    Complete {
        file: PathBuf,

        /// Cursor offset in UTF-16 code units
        #[arg(short, long)]
        offset: usize,

        /// Workspace whose file names are offered too
        #[arg(short, long, value_name = "DIR")]
        workspace: Option<PathBuf>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Word, character and paragraph counts
    Stats { file: PathBuf },

    /// Markdown heading outline
    Outline { file: PathBuf },

    /// Changed files in a git work tree
    GitStatus {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Diff of one file, unstaged changes first
    GitDiff {
        /// Repository-relative path
        path: String,

        #[arg(short, long, value_name = "DIR", default_value = ".")]
        workspace: PathBuf,
    },

    /// File tree of a workspace, or quick-open matches
    Index {
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Quick-open query
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Syntax highlight spans
    Highlight { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Balenciaga v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(args.command, config, &mut out).await
}

/// Runs one subcommand, writing its report to `out`.
async fn run(command: Commands, config: Config, out: &mut impl Write) -> anyhow::Result<()> {
    let timeout = config.diagnostics.tool_timeout();
    let mut editor = Editor::with_config(config);

    match command {
        Commands::Diagnose {
            file,
            language,
            json,
        } => {
            open(&mut editor, &file)?;
            let doc = editor.active_document()?;
            let language = language.unwrap_or(doc.language());
            let engine = DiagnosticsEngine::from_config(&editor.config().diagnostics);
            let items = engine
                .diagnostics(&doc.text(), language, doc.path())
                .await;

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&items)?)?;
            } else if items.is_empty() {
                writeln!(out, "No problems found.")?;
            } else {
                for item in &items {
                    writeln!(out, "{}:{item}", file.display())?;
                }
            }
        }

        Commands::Complete {
            file,
            offset,
            workspace,
            json,
        } => {
            if let Some(dir) = workspace {
                editor
                    .open_workspace(&dir)
                    .with_context(|| format!("Failed to open workspace {}", dir.display()))?;
            }
            let id = open(&mut editor, &file)?;
            editor.set_selection(id, TextRange::caret(offset))?;

            let engine = CompletionEngine::from_config(&editor.config().completion);
            let doc = editor.document(id)?;
            let items = engine.suggestions(
                &doc.text(),
                doc.selection(),
                doc.language(),
                &editor.workspace_file_names(),
            );

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&items)?)?;
            } else {
                for item in &items {
                    writeln!(out, "{}", item.label)?;
                }
            }
        }

        Commands::Stats { file } => {
            open(&mut editor, &file)?;
            let stats = editor.document_statistics();
            writeln!(out, "Words:        {}", stats.words)?;
            writeln!(out, "Characters:   {}", stats.characters)?;
            writeln!(out, "Paragraphs:   {}", stats.paragraphs)?;
            writeln!(out, "Reading time: {} min", stats.reading_minutes)?;
            writeln!(
                out,
                "Goal:         {:.0}% of {} words",
                editor.goal_progress() * 100.0,
                editor.view().writing_goal_words()
            )?;
        }

        Commands::Outline { file } => {
            open(&mut editor, &file)?;
            for heading in editor.outline_headings() {
                let indent = "  ".repeat(heading.level.saturating_sub(1));
                writeln!(out, "{indent}{} (line {})", heading.title, heading.line)?;
            }
        }

        Commands::GitStatus { dir } => {
            let git = GitStatusService::with_shell(ProcessShell::new(timeout));
            if !git.is_repository(Some(&dir)).await {
                writeln!(out, "Not a git repository: {}", dir.display())?;
                return Ok(());
            }
            let statuses = git.status(Some(&dir)).await;
            if statuses.is_empty() {
                writeln!(out, "No changes.")?;
            }
            for status in statuses {
                writeln!(out, "{} {}", status.display_code(), status.path)?;
            }
        }

        Commands::GitDiff { path, workspace } => {
            let git = GitStatusService::with_shell(ProcessShell::new(timeout));
            write!(out, "{}", git.diff(Some(&workspace), &path).await)?;
        }

        Commands::Index { dir, query } => {
            editor
                .open_workspace(&dir)
                .with_context(|| format!("Failed to open workspace {}", dir.display()))?;
            let Some(workspace) = editor.workspace() else {
                anyhow::bail!("No workspace open");
            };
            match query {
                Some(query) => {
                    for path in editor.quick_open(&query) {
                        let shown = workspace.relative(&path).unwrap_or(path);
                        writeln!(out, "{}", shown.display())?;
                    }
                }
                None => {
                    writeln!(out, "{}/", workspace.name())?;
                    write_tree(out, workspace.tree(), 1)?;
                }
            }
        }

        Commands::Highlight { file } => {
            open(&mut editor, &file)?;
            let doc = editor.active_document()?;
            let text = doc.text();
            for span in balenciaga_syntax::highlight(doc.language(), &text) {
                writeln!(
                    out,
                    "{}..{} {} {:?}",
                    span.start,
                    span.end,
                    span.kind.theme_key(),
                    span.text(&text)
                )?;
            }
        }
    }

    Ok(())
}

fn open(editor: &mut Editor, file: &Path) -> anyhow::Result<balenciaga_core::DocumentId> {
    editor
        .open_document(file)
        .with_context(|| format!("Failed to open {}", file.display()))
}

fn write_tree(out: &mut impl Write, nodes: &[FileNode], depth: usize) -> std::io::Result<()> {
    for node in nodes {
        let indent = "  ".repeat(depth);
        if node.is_directory() {
            writeln!(out, "{indent}{}/", node.name())?;
            write_tree(out, &node.children, depth + 1)?;
        } else {
            writeln!(out, "{indent}{}", node.name())?;
        }
    }
    Ok(())
}
