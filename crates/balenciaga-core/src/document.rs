//! Document management.
//!
//! ## Learning: Type Aliases and Newtypes
//!
//! `DocumentId` is a newtype wrapper around `Uuid`. This provides:
//! - Type safety: Can't accidentally use a string as a document ID
//! - Encapsulation: Can change the underlying type without breaking APIs
//! - Documentation: The type name explains its purpose

use balenciaga_buffer::{Position, TextBuffer, TextRange, identifier_prefix_range, utf16_len};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::analysis::{self, DocumentHeading, DocumentStats};
use crate::language::Language;
use crate::pane::{EditorPane, PaneLayout, SplitMode};
use crate::{CoreError, CoreResult};

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name for documents without a backing file.
pub const UNTITLED: &str = "Untitled";

/// One open tab: a text buffer plus the state the editor tracks about it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique identifier
    id: DocumentId,

    /// The underlying text buffer
    buffer: TextBuffer,

    /// File path (None for untitled documents)
    path: Option<PathBuf>,

    /// Display name
    name: String,

    /// Document language
    language: Language,

    /// Text differs from what was last written to disk
    dirty: bool,

    /// Last selection reported for this tab (UTF-16 units)
    selection: TextRange,
}

impl Document {
    /// Creates a new empty, untitled document.
    pub fn new() -> Self {
        Self {
            id: DocumentId::new(),
            buffer: TextBuffer::new(),
            path: None,
            name: UNTITLED.to_string(),
            language: Language::Plain,
            dirty: false,
            selection: TextRange::default(),
        }
    }

    /// Creates an untitled document holding `text`.
    pub fn with_text(text: &str, language: Language) -> Self {
        Self {
            buffer: TextBuffer::from(text),
            language,
            ..Self::new()
        }
    }

    /// Opens a document from a file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let buffer = TextBuffer::from_file(path)?;

        Ok(Self {
            id: DocumentId::new(),
            buffer,
            path: Some(path.to_path_buf()),
            name: display_name(path),
            language: Language::from_path(path),
            dirty: false,
            selection: TextRange::default(),
        })
    }

    // ==================== Getters ====================

    /// Returns the document ID.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the language tag.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Overrides the detected language.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Returns true if the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the text buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns all text.
    pub fn text(&self) -> Cow<'_, str> {
        self.buffer.text()
    }

    /// Returns the last known selection, clamped to the current text.
    pub fn selection(&self) -> TextRange {
        self.buffer.clamp(self.selection)
    }

    /// Returns the caret's 1-based line and column.
    pub fn cursor_position(&self) -> Position {
        self.buffer.line_column(self.selection().location)
    }

    // ==================== File Operations ====================

    /// Writes the text to the document's own path.
    pub fn save(&mut self) -> CoreResult<()> {
        let path = self.path.clone().ok_or(CoreError::NoDestination(self.id))?;
        self.buffer.write_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    /// Writes the text to `path` and adopts it as the backing file.
    ///
    /// Name and language follow the new path. On failure nothing changes.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        self.buffer.write_to(path)?;
        self.path = Some(path.to_path_buf());
        self.name = display_name(path);
        self.language = Language::from_path(path);
        self.dirty = false;
        Ok(())
    }

    // ==================== Text Editing ====================

    /// Replaces the whole text and the selection, as reported by the UI.
    pub fn set_text_and_selection(&mut self, text: &str, selection: TextRange) {
        self.buffer.set_text(text);
        self.selection = selection;
        self.dirty = true;
    }

    /// Records a new selection without touching the text.
    pub fn set_selection(&mut self, selection: TextRange) {
        self.selection = selection;
    }

    /// Surrounds the selection with `prefix` and `suffix`.
    ///
    /// With nothing selected, inserts `prefix + suffix` and leaves the caret
    /// between them. Otherwise wraps the selection and puts the caret after
    /// the inserted text.
    pub fn wrap_selection(&mut self, prefix: &str, suffix: &str) {
        let selection = self.selection();
        let selected = self.buffer.slice_utf16(selection);

        let (replacement, caret) = if selected.is_empty() {
            (
                format!("{prefix}{suffix}"),
                selection.location + utf16_len(prefix),
            )
        } else {
            let replacement = format!("{prefix}{selected}{suffix}");
            let caret = selection.location + utf16_len(&replacement);
            (replacement, caret)
        };

        self.buffer.replace_utf16(selection, &replacement);
        self.selection = TextRange::caret(caret);
        self.dirty = true;
    }

    /// Prefixes every non-blank line touched by the selection.
    ///
    /// The selection first grows to whole lines; afterwards the modified
    /// block is selected.
    pub fn prefix_selected_lines(&mut self, prefix: &str) {
        let block_range = self.buffer.line_range(self.selection());
        let block = self.buffer.slice_utf16(block_range);

        let prefixed = block
            .split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    line.to_string()
                } else {
                    format!("{prefix}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.buffer.replace_utf16(block_range, &prefixed);
        self.selection = TextRange::new(block_range.location, utf16_len(&prefixed));
        self.dirty = true;
    }

    /// Replaces the selection with `text` and puts the caret after it.
    pub fn insert_at_cursor(&mut self, text: &str) {
        let replaced = self.buffer.replace_utf16(self.selection(), text);
        self.selection = TextRange::caret(replaced.location + utf16_len(text));
        self.dirty = true;
    }

    /// Replaces the identifier prefix before the caret with `insert_text`.
    ///
    /// With no prefix this is a plain insertion at the caret.
    pub fn apply_completion(&mut self, insert_text: &str) {
        let caret = self.selection().location;
        let prefix = identifier_prefix_range(&self.buffer.text(), caret);
        self.buffer.replace_utf16(prefix, insert_text);
        self.selection = TextRange::caret(prefix.location + utf16_len(insert_text));
        self.dirty = true;
    }

    /// Moves the caret to the start of 1-based `line`.
    pub fn go_to_line(&mut self, line: usize) {
        self.selection = TextRange::caret(self.buffer.offset_of_line(line));
    }

    // ==================== Analysis ====================

    /// Word, character, paragraph and reading-time counts.
    pub fn statistics(&self, words_per_minute: usize) -> DocumentStats {
        DocumentStats::compute(&self.text(), words_per_minute)
    }

    /// Markdown headings in document order.
    pub fn headings(&self) -> Vec<DocumentHeading> {
        analysis::outline_headings(&self.text())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(UNTITLED)
        .to_string()
}

/// Manages the open tabs and the panes showing them.
#[derive(Debug, Default)]
pub struct DocumentManager {
    /// All open documents
    documents: HashMap<DocumentId, Document>,

    /// Order of documents (for tabs)
    order: Vec<DocumentId>,

    /// Pane pointers; the focused pane's tab is the active one
    panes: PaneLayout,
}

impl DocumentManager {
    /// Creates a new document manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document and makes it active.
    pub fn add(&mut self, doc: Document) -> DocumentId {
        let id = doc.id();
        self.documents.insert(id, doc);
        self.order.push(id);
        self.panes.set_tab(self.panes.focused, Some(id));
        id
    }

    /// Removes a document.
    ///
    /// Every pane that showed it switches to the most recently added
    /// remaining tab, or to nothing.
    pub fn close(&mut self, id: DocumentId) -> CoreResult<Document> {
        let doc = self
            .documents
            .remove(&id)
            .ok_or(CoreError::DocumentNotFound(id))?;
        self.order.retain(|&i| i != id);
        self.panes.reassign(id, self.order.last().copied());
        Ok(doc)
    }

    /// Returns a document by ID.
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Returns a mutable document by ID.
    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// Returns the ID of the active document.
    pub fn active_id(&self) -> Option<DocumentId> {
        self.panes.active()
    }

    /// Returns the active document.
    pub fn active(&self) -> Option<&Document> {
        self.active_id().and_then(|id| self.documents.get(&id))
    }

    /// Returns a mutable reference to the active document.
    pub fn active_mut(&mut self) -> Option<&mut Document> {
        self.active_id().and_then(|id| self.documents.get_mut(&id))
    }

    /// Sets the active document (the focused pane's tab).
    ///
    /// Unknown IDs are ignored.
    pub fn set_active(&mut self, id: DocumentId) -> bool {
        if !self.documents.contains_key(&id) {
            return false;
        }
        self.panes.set_tab(self.panes.focused, Some(id));
        true
    }

    /// Finds a document by path.
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.documents.get(id).and_then(Document::path) == Some(path))
    }

    /// Returns an iterator over all documents in tab order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.order.iter().filter_map(|id| self.documents.get(id))
    }

    /// Returns the document order (for tabs).
    pub fn order(&self) -> &[DocumentId] {
        &self.order
    }

    /// Returns the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    // ==================== Panes ====================

    /// Returns the pane layout.
    pub fn panes(&self) -> &PaneLayout {
        &self.panes
    }

    /// Changes the split mode.
    ///
    /// Splitting fills an empty secondary pane with another tab when there
    /// is one, else with the primary tab. Returning to a single pane drops
    /// the secondary pointer and focuses the primary pane.
    pub fn set_split_mode(&mut self, mode: SplitMode) {
        self.panes.mode = mode;
        if !mode.is_split() {
            self.panes.secondary = None;
            self.panes.focused = EditorPane::Primary;
            return;
        }
        if self.panes.secondary.is_none() {
            let primary = self.panes.primary;
            self.panes.secondary = self
                .order
                .iter()
                .rev()
                .copied()
                .find(|id| Some(*id) != primary)
                .or(primary);
        }
    }

    /// Shows tab `id` in `pane`.
    pub fn set_tab(&mut self, id: DocumentId, pane: EditorPane) -> bool {
        if !self.documents.contains_key(&id) {
            return false;
        }
        self.panes.set_tab(pane, Some(id));
        true
    }

    /// Moves focus to `pane`; its tab becomes the active document.
    ///
    /// Without a split only the primary pane can hold focus.
    pub fn set_focused_pane(&mut self, pane: EditorPane) {
        self.panes.focused = if self.panes.mode.is_split() {
            pane
        } else {
            EditorPane::Primary
        };
    }
}
