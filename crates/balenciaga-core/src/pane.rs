//! Split-view pane layout.
//!
//! The editor area shows one pane, or two side by side / stacked. Each pane
//! points at a tab; the focused pane decides which tab is "active".

use serde::{Deserialize, Serialize};

use crate::document::DocumentId;

/// How the editor area is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    #[default]
    Single,
    Vertical,
    Horizontal,
}

impl SplitMode {
    /// Returns true if a second pane is visible.
    pub fn is_split(&self) -> bool {
        *self != SplitMode::Single
    }
}

/// One of the two editor panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorPane {
    #[default]
    Primary,
    Secondary,
}

/// Which tab each pane shows and which pane has focus.
///
/// Invariant: every `Some` pointer refers to an open tab. The document
/// manager is responsible for keeping it that way when tabs close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaneLayout {
    pub mode: SplitMode,
    pub primary: Option<DocumentId>,
    pub secondary: Option<DocumentId>,
    pub focused: EditorPane,
}

impl PaneLayout {
    /// Returns the tab shown in `pane`.
    pub fn tab(&self, pane: EditorPane) -> Option<DocumentId> {
        match pane {
            EditorPane::Primary => self.primary,
            EditorPane::Secondary => self.secondary,
        }
    }

    /// Points `pane` at `id`.
    pub fn set_tab(&mut self, pane: EditorPane, id: Option<DocumentId>) {
        match pane {
            EditorPane::Primary => self.primary = id,
            EditorPane::Secondary => self.secondary = id,
        }
    }

    /// The tab of the focused pane.
    pub fn active(&self) -> Option<DocumentId> {
        self.tab(self.focused)
    }

    /// Replaces every pointer to `closed` with `replacement`.
    pub fn reassign(&mut self, closed: DocumentId, replacement: Option<DocumentId>) {
        if self.primary == Some(closed) {
            self.primary = replacement;
        }
        if self.secondary == Some(closed) {
            self.secondary = replacement;
        }
    }
}
