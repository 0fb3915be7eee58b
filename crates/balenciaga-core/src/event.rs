//! Change notifications from the [`Editor`](crate::Editor).
//!
//! ## Learning: One Writer, Many Readers
//!
//! The editor is the only thing that mutates documents. Views that need to
//! redraw (tab bar, status line, sidebar) subscribe to a
//! `tokio::sync::broadcast` channel and then read a fresh
//! [`EditorSnapshot`](crate::EditorSnapshot) instead of keeping their own
//! copies of editor state in sync.

use std::path::PathBuf;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::document::DocumentId;
use crate::pane::{EditorPane, SplitMode};

/// Events buffered per subscriber.
pub const EVENT_CAPACITY: usize = 256;

/// Something the editor changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    // Tabs
    /// A tab was opened or created
    DocumentOpened(DocumentId),
    /// A document was closed
    DocumentClosed(DocumentId),
    /// A document was saved
    DocumentSaved(DocumentId),
    /// A document was saved by the autosave timer
    DocumentAutosaved(DocumentId),
    /// A document's content changed
    DocumentChanged(DocumentId),
    /// A document became the active tab
    DocumentFocused(DocumentId),

    // Chrome
    /// The status line text changed
    StatusChanged(String),
    /// The focused pane changed
    PaneFocused(EditorPane),
    /// The split layout changed
    SplitModeChanged(SplitMode),
    /// A view toggle (sidebar, preview, ...) changed
    ViewChanged,

    // Workspace
    /// A workspace root was opened
    WorkspaceOpened(PathBuf),
    /// The file tree and index were rebuilt
    WorkspaceRefreshed,
}

/// Broadcasts [`EditorEvent`]s to every subscriber.
///
/// Sending never blocks. A subscriber that falls more than
/// [`EVENT_CAPACITY`] events behind skips the oldest ones.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Sends `event`; dropped silently when nobody is listening.
    pub fn emit(&self, event: EditorEvent) {
        let _ = self.sender.send(event);
    }

    /// Returns a receiver for events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver wrapper that skips over lag instead of reporting it.
///
/// ```ignore
/// let mut events = EventHandler::new(editor.subscribe());
/// while let Some(event) = events.next().await {
///     if let EditorEvent::StatusChanged(text) = event {
///         status_line.set(text);
///     }
/// }
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event; `None` once the editor is gone.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next queued event without waiting.
    pub fn try_next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }
}
