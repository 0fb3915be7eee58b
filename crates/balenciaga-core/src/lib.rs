//! # Balenciaga Core
//!
//! Core editor logic and state management.
//!
//! ## Layout
//!
//! ```text
//! Editor
//!  ├─ Config            loaded once, read everywhere
//!  ├─ Workspace         root folder, file tree, notify watcher
//!  ├─ RecentFiles       most recently opened paths
//!  ├─ DocumentManager   open tabs, active tab, pane layout
//!  │    └─ Document     buffer + path + selection + dirty flag
//!  ├─ AutosaveScheduler one pending generation per tab
//!  ├─ Keymap            key chord → Command
//!  └─ EventBus          broadcast of EditorEvent
//! ```
//!
//! ## Unidirectional updates
//!
//! The `Editor` is the only owner of mutable state. UI layers send it
//! [`Command`]s (or call its methods), then render an [`EditorSnapshot`]
//! or react to [`EditorEvent`]s. Nothing outside the controller holds a
//! `&mut Document`.

pub mod analysis;
pub mod autosave;
pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod keymap;
pub mod language;
pub mod pane;
pub mod recent;
pub mod workspace;

pub use analysis::{DocumentHeading, DocumentStats};
pub use command::Command;
pub use config::Config;
pub use document::{Document, DocumentId, DocumentManager};
pub use editor::{Editor, EditorSnapshot, TabSnapshot, ViewState};
pub use event::{EditorEvent, EventBus, EventHandler};
pub use keymap::{KeyBinding, KeyPress, Keymap};
pub use language::Language;
pub use pane::{EditorPane, PaneLayout, SplitMode};
pub use recent::RecentFiles;
pub use workspace::{FileChange, FileNode, NodeKind, Workspace};

pub use balenciaga_buffer::{Position, TextRange};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("No active document")]
    NoActiveDocument,

    #[error("Document {0} has no file path; a destination is required")]
    NoDestination(DocumentId),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] balenciaga_buffer::BufferError),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}
