//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to
//! complex subsystems. External code only needs to interact with
//! `Editor`, not individual components.
//!
//! ## Status Line
//!
//! Every user-visible operation leaves a short uppercase status string
//! ("SAVED NOTES.MD", "FAILED TO OPEN FILE", ...). Fallible operations also
//! return a `CoreResult`, so callers can choose between the two.

use std::path::{Path, PathBuf};

use balenciaga_buffer::{Position, TextRange};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::analysis::{DocumentHeading, DocumentStats};
use crate::autosave::{AutosaveScheduler, DEFAULT_AUTOSAVE_DELAY};
use crate::command::Command;
use crate::config::Config;
use crate::document::{Document, DocumentId, DocumentManager};
use crate::event::{EditorEvent, EventBus};
use crate::keymap::{KeyPress, Keymap};
use crate::language::Language;
use crate::pane::{EditorPane, PaneLayout, SplitMode};
use crate::recent::RecentFiles;
use crate::workspace::{FileChange, Workspace};
use crate::{CoreError, CoreResult};

/// Smallest writing goal the inspector allows.
pub const MIN_WRITING_GOAL: usize = 100;

/// Largest writing goal the inspector allows.
pub const MAX_WRITING_GOAL: usize = 10_000;

/// Panel visibility and writing-mode toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub show_sidebar: bool,
    pub show_inspector: bool,
    pub show_preview: bool,
    pub focus_mode: bool,
    pub typewriter_mode: bool,
    pub show_line_numbers: bool,
    pub show_quick_open: bool,
    pub show_go_to_line: bool,
    pub show_find: bool,
    writing_goal_words: usize,
}

impl ViewState {
    fn new(writing_goal_words: usize) -> Self {
        Self {
            show_sidebar: true,
            show_inspector: true,
            show_preview: false,
            focus_mode: false,
            typewriter_mode: false,
            show_line_numbers: false,
            show_quick_open: false,
            show_go_to_line: false,
            show_find: false,
            writing_goal_words: writing_goal_words.clamp(MIN_WRITING_GOAL, MAX_WRITING_GOAL),
        }
    }

    /// Enters or leaves focus mode.
    ///
    /// Entering hides the sidebar, inspector and preview. Leaving brings
    /// back the sidebar and inspector only.
    pub fn toggle_focus_mode(&mut self) {
        self.focus_mode = !self.focus_mode;
        if self.focus_mode {
            self.show_sidebar = false;
            self.show_inspector = false;
            self.show_preview = false;
        } else {
            self.show_sidebar = true;
            self.show_inspector = true;
        }
    }

    pub fn writing_goal_words(&self) -> usize {
        self.writing_goal_words
    }

    /// Sets the goal, clamped to the allowed range.
    pub fn set_writing_goal_words(&mut self, words: usize) {
        self.writing_goal_words = words.clamp(MIN_WRITING_GOAL, MAX_WRITING_GOAL);
    }

    /// Fraction of the goal reached, capped at 1.0.
    pub fn goal_progress(&self, words: usize) -> f64 {
        if self.writing_goal_words == 0 {
            return 0.0;
        }
        (words as f64 / self.writing_goal_words as f64).min(1.0)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Tab strip entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSnapshot {
    pub id: DocumentId,
    pub name: String,
    pub path: Option<PathBuf>,
    pub language: Language,
    pub dirty: bool,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone)]
pub struct EditorSnapshot {
    pub tabs: Vec<TabSnapshot>,
    pub active: Option<DocumentId>,
    pub panes: PaneLayout,
    pub status: String,
    pub view: ViewState,
    pub stats: DocumentStats,
    pub cursor: Option<Position>,
    pub workspace: Option<PathBuf>,
}

/// The main editor state.
///
/// ## Thread Safety
///
/// `Editor` is designed to be owned by a single thread (the main/UI thread).
/// Autosave timers run on the tokio runtime and report back through a
/// channel; the save itself happens on the owner's side, in
/// [`Editor::next_autosave`] or [`Editor::poll_autosaves`].
pub struct Editor {
    /// Document management
    documents: DocumentManager,

    /// Current workspace
    workspace: Option<Workspace>,

    /// Recently opened or saved files
    recent: RecentFiles,

    /// Editor configuration
    config: Config,

    /// Key bindings
    keymap: Keymap,

    /// Debounce timers for unsaved edits
    autosave: AutosaveScheduler,

    /// Event bus for notifications
    event_bus: EventBus,

    /// Panels and writing modes
    view: ViewState,

    /// Status line text
    status: String,
}

impl Editor {
    /// Creates a new editor instance.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let keymap = Keymap::from_config(&config);
        let delay = config
            .editor
            .autosave_delay()
            .unwrap_or(DEFAULT_AUTOSAVE_DELAY);

        Self {
            documents: DocumentManager::new(),
            workspace: None,
            recent: RecentFiles::new(config.editor.recent_files_limit),
            keymap,
            autosave: AutosaveScheduler::new(delay),
            event_bus: EventBus::new(),
            view: ViewState::new(config.editor.writing_goal_words),
            status: "READY".to_string(),
            config,
        }
    }

    // ==================== Document Operations ====================

    /// Creates a new untitled document and makes it active.
    pub fn create_document(&mut self) -> DocumentId {
        let id = self.documents.add(Document::new());

        self.emit(EditorEvent::DocumentOpened(id));
        self.emit(EditorEvent::DocumentFocused(id));
        self.set_status("NEW DOCUMENT");

        id
    }

    /// Opens a file, or activates its tab if it is already open.
    pub fn open_document(&mut self, path: impl AsRef<Path>) -> CoreResult<DocumentId> {
        let path = path.as_ref();

        // Check if already open
        if let Some(id) = self.documents.find_by_path(path) {
            self.documents.set_active(id);
            self.emit(EditorEvent::DocumentFocused(id));
            return Ok(id);
        }

        let doc = match Document::from_file(path) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open file");
                self.set_status("FAILED TO OPEN FILE");
                return Err(err);
            }
        };

        let name = doc.name().to_uppercase();
        let id = self.documents.add(doc);
        self.recent.push(path);

        self.emit(EditorEvent::DocumentOpened(id));
        self.emit(EditorEvent::DocumentFocused(id));
        self.set_status(format!("OPENED {name}"));

        Ok(id)
    }

    /// Saves the active document to its own path.
    pub fn save_active(&mut self) -> CoreResult<()> {
        let Some(id) = self.documents.active_id() else {
            self.set_status("NO ACTIVE DOCUMENT");
            return Err(CoreError::NoActiveDocument);
        };
        self.save(id)
    }

    /// Saves a document to its own path.
    ///
    /// Untitled documents need [`Editor::save_as`].
    pub fn save(&mut self, id: DocumentId) -> CoreResult<()> {
        let doc = self
            .documents
            .get_mut(id)
            .ok_or(CoreError::DocumentNotFound(id))?;

        let Some(path) = doc.path().map(Path::to_path_buf) else {
            self.set_status("SAVE REQUIRES A DESTINATION");
            return Err(CoreError::NoDestination(id));
        };

        match doc.save() {
            Ok(()) => {
                let name = doc.name().to_uppercase();
                self.autosave.cancel(id);
                self.recent.push(&path);
                self.emit(EditorEvent::DocumentSaved(id));
                self.set_status(format!("SAVED {name}"));
                Ok(())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "save failed");
                self.set_status("SAVE FAILED");
                Err(err)
            }
        }
    }

    /// Writes a document to `path` and makes that its backing file.
    pub fn save_as(&mut self, id: DocumentId, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let doc = self
            .documents
            .get_mut(id)
            .ok_or(CoreError::DocumentNotFound(id))?;

        match doc.save_as(path) {
            Ok(()) => {
                let name = doc.name().to_uppercase();
                self.autosave.cancel(id);
                self.recent.push(path);
                self.emit(EditorEvent::DocumentSaved(id));
                self.set_status(format!("SAVED {name}"));
                self.refresh_workspace();
                Ok(())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "save as failed");
                self.set_status("SAVE FAILED");
                Err(err)
            }
        }
    }

    /// Saves every document that has a path.
    ///
    /// Keeps going after a failure and returns the first error.
    pub fn save_all(&mut self) -> CoreResult<()> {
        let ids: Vec<DocumentId> = self
            .documents
            .iter()
            .filter(|doc| doc.path().is_some())
            .map(Document::id)
            .collect();

        let mut first_error = None;
        for id in ids {
            if let Err(err) = self.save(id) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Closes a document. Unsaved changes are discarded.
    pub fn close_document(&mut self, id: DocumentId) -> CoreResult<()> {
        self.documents.close(id)?;
        self.autosave.cancel(id);
        self.emit(EditorEvent::DocumentClosed(id));

        if let Some(active) = self.documents.active_id() {
            self.emit(EditorEvent::DocumentFocused(active));
        }
        if self.documents.is_empty() {
            self.set_status("NO DOCUMENT OPEN");
        }
        Ok(())
    }

    /// Makes `id` the active document (the focused pane's tab).
    pub fn set_active(&mut self, id: DocumentId) -> CoreResult<()> {
        if !self.documents.set_active(id) {
            return Err(CoreError::DocumentNotFound(id));
        }
        self.emit(EditorEvent::DocumentFocused(id));
        Ok(())
    }

    /// Replaces a document's text and selection, as typed in the UI.
    pub fn set_text_and_selection(
        &mut self,
        id: DocumentId,
        text: &str,
        selection: TextRange,
    ) -> CoreResult<()> {
        self.documents
            .get_mut(id)
            .ok_or(CoreError::DocumentNotFound(id))?
            .set_text_and_selection(text, selection);
        self.mark_changed(id);
        self.set_status("EDITING");
        Ok(())
    }

    /// Records a document's selection. Does not dirty the document.
    pub fn set_selection(&mut self, id: DocumentId, selection: TextRange) -> CoreResult<()> {
        self.documents
            .get_mut(id)
            .ok_or(CoreError::DocumentNotFound(id))?
            .set_selection(selection);
        Ok(())
    }

    /// Returns the active document.
    pub fn active_document(&self) -> CoreResult<&Document> {
        self.documents.active().ok_or(CoreError::NoActiveDocument)
    }

    /// Returns a document by ID.
    pub fn document(&self, id: DocumentId) -> CoreResult<&Document> {
        self.documents.get(id).ok_or(CoreError::DocumentNotFound(id))
    }

    /// Returns the tab store.
    pub fn documents(&self) -> &DocumentManager {
        &self.documents
    }

    /// Returns true if any document has unsaved changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.documents.iter().any(Document::is_dirty)
    }

    // ==================== Formatting ====================

    /// Wraps the active selection in `**`.
    pub fn bold(&mut self) -> DocumentId {
        self.wrap_selection("**", "**")
    }

    /// Wraps the active selection in `*`.
    pub fn italic(&mut self) -> DocumentId {
        self.wrap_selection("*", "*")
    }

    /// Wraps the active selection in backticks.
    pub fn inline_code(&mut self) -> DocumentId {
        self.wrap_selection("`", "`")
    }

    /// Turns the selected lines into headings.
    pub fn heading(&mut self) -> DocumentId {
        self.prefix_selected_lines("# ")
    }

    /// Turns the selected lines into list items.
    pub fn bullet_list(&mut self) -> DocumentId {
        self.prefix_selected_lines("- ")
    }

    /// Turns the selected lines into a block quote.
    pub fn quote(&mut self) -> DocumentId {
        self.prefix_selected_lines("> ")
    }

    /// Inserts today's date, e.g. "March 4, 2025", as its own paragraph.
    pub fn insert_date_stamp(&mut self) -> DocumentId {
        let stamp = chrono::Local::now().format("%B %-d, %Y");
        let id = self.insert_at_cursor(&format!("\n\n{stamp}\n\n"));
        self.set_status("DATE INSERTED");
        id
    }

    /// Surrounds the active selection with `prefix` and `suffix`.
    ///
    /// With no active document a new one is created first.
    pub fn wrap_selection(&mut self, prefix: &str, suffix: &str) -> DocumentId {
        self.edit_active(|doc| doc.wrap_selection(prefix, suffix))
    }

    /// Prefixes each non-blank line touched by the active selection.
    pub fn prefix_selected_lines(&mut self, prefix: &str) -> DocumentId {
        self.edit_active(|doc| doc.prefix_selected_lines(prefix))
    }

    /// Replaces the active selection with `text`.
    pub fn insert_at_cursor(&mut self, text: &str) -> DocumentId {
        self.edit_active(|doc| doc.insert_at_cursor(text))
    }

    /// Replaces the identifier prefix at the caret of `pane`'s tab.
    pub fn apply_completion(&mut self, insert_text: &str, pane: EditorPane) -> CoreResult<()> {
        let id = self
            .documents
            .panes()
            .tab(pane)
            .ok_or(CoreError::NoActiveDocument)?;
        self.documents
            .get_mut(id)
            .ok_or(CoreError::DocumentNotFound(id))?
            .apply_completion(insert_text);
        self.mark_changed(id);
        Ok(())
    }

    fn edit_active(&mut self, edit: impl FnOnce(&mut Document)) -> DocumentId {
        let id = match self.documents.active_id() {
            Some(id) => id,
            None => self.create_document(),
        };
        if let Some(doc) = self.documents.get_mut(id) {
            edit(doc);
        }
        self.mark_changed(id);
        id
    }

    fn mark_changed(&mut self, id: DocumentId) {
        if self.config.editor.autosave_delay().is_some() {
            self.autosave.schedule(id);
        }
        self.emit(EditorEvent::DocumentChanged(id));
    }

    // ==================== Navigation & Analysis ====================

    /// Moves the active caret to the start of 1-based `line`.
    ///
    /// Line 0 and a missing active document are ignored.
    pub fn go_to_line(&mut self, line: usize) {
        if line == 0 {
            return;
        }
        let Some(doc) = self.documents.active_mut() else {
            return;
        };
        doc.go_to_line(line);
        self.view.show_go_to_line = false;
        self.set_status(format!("JUMPED TO LINE {line}"));
    }

    pub fn jump_to_heading(&mut self, heading: &DocumentHeading) {
        self.go_to_line(heading.line);
    }

    /// Headings of the active document.
    pub fn outline_headings(&self) -> Vec<DocumentHeading> {
        self.documents
            .active()
            .map(Document::headings)
            .unwrap_or_default()
    }

    /// Statistics of the active document.
    pub fn document_statistics(&self) -> DocumentStats {
        self.documents
            .active()
            .map(|doc| doc.statistics(self.config.editor.reading_words_per_minute))
            .unwrap_or(DocumentStats::EMPTY)
    }

    /// Caret line and column of the active document.
    pub fn cursor_line_column(&self) -> Option<Position> {
        self.documents.active().map(Document::cursor_position)
    }

    // ==================== Panes ====================

    pub fn set_split_mode(&mut self, mode: SplitMode) {
        self.documents.set_split_mode(mode);
        self.emit(EditorEvent::SplitModeChanged(mode));
    }

    /// Shows tab `id` in `pane`.
    pub fn set_tab(&mut self, id: DocumentId, pane: EditorPane) -> CoreResult<()> {
        if !self.documents.set_tab(id, pane) {
            return Err(CoreError::DocumentNotFound(id));
        }
        if self.documents.panes().focused == pane {
            self.emit(EditorEvent::DocumentFocused(id));
        }
        Ok(())
    }

    pub fn set_focused_pane(&mut self, pane: EditorPane) {
        self.documents.set_focused_pane(pane);
        let pane = self.documents.panes().focused;
        self.emit(EditorEvent::PaneFocused(pane));
        if let Some(id) = self.documents.active_id() {
            self.emit(EditorEvent::DocumentFocused(id));
        }
    }

    pub fn panes(&self) -> &PaneLayout {
        self.documents.panes()
    }

    // ==================== Workspace ====================

    /// Opens a workspace.
    ///
    /// A directory becomes the workspace root. A file opens its directory as
    /// the workspace and then the file itself.
    pub fn open_workspace(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let workspace = Workspace::open(path, &self.config.workspace)?;
        let root = workspace.root().to_path_buf();
        self.workspace = Some(workspace);
        self.emit(EditorEvent::WorkspaceOpened(root));

        if path.is_file() {
            self.open_document(path)?;
        } else {
            self.set_status("WORKSPACE OPENED");
        }
        Ok(())
    }

    /// Rebuilds the workspace tree and file index.
    pub fn refresh_workspace(&mut self) {
        if let Some(workspace) = &mut self.workspace {
            workspace.refresh();
            self.emit(EditorEvent::WorkspaceRefreshed);
        }
    }

    /// Starts reporting on-disk changes under the workspace root. Returns
    /// `None` when no workspace is open.
    pub fn watch_workspace(&mut self) -> CoreResult<Option<mpsc::Receiver<FileChange>>> {
        match &mut self.workspace {
            Some(workspace) => Ok(Some(workspace.start_watching()?)),
            None => Ok(None),
        }
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    /// Quick-open matches from the workspace index.
    pub fn quick_open(&self, query: &str) -> Vec<PathBuf> {
        self.workspace
            .as_ref()
            .map(|ws| {
                ws.quick_open(query, self.config.workspace.quick_open_limit)
                    .into_iter()
                    .map(Path::to_path_buf)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Workspace file names without extensions, for completion.
    pub fn workspace_file_names(&self) -> Vec<String> {
        self.workspace
            .as_ref()
            .map(Workspace::workspace_file_names)
            .unwrap_or_default()
    }

    pub fn recent_files(&self) -> &RecentFiles {
        &self.recent
    }

    // ==================== Autosave ====================

    /// Waits for the next autosave timer and saves that document.
    ///
    /// Returns the document whose timer fired. Pends forever while no timer
    /// is running, so front ends should `select!` on it alongside input.
    pub async fn next_autosave(&mut self) -> Option<DocumentId> {
        let id = self.autosave.next_due().await?;
        self.autosave_if_possible(id);
        Some(id)
    }

    /// Saves every document whose timer already fired. Returns how many
    /// timers were handled.
    pub fn poll_autosaves(&mut self) -> usize {
        let mut handled = 0;
        while let Some(id) = self.autosave.try_next_due() {
            self.autosave_if_possible(id);
            handled += 1;
        }
        handled
    }

    fn autosave_if_possible(&mut self, id: DocumentId) {
        let Some(doc) = self.documents.get_mut(id) else {
            return;
        };
        let Some(path) = doc.path().map(Path::to_path_buf) else {
            debug!(document = %id, "untitled document, skipping autosave");
            return;
        };

        match doc.save() {
            Ok(()) => {
                self.recent.push(&path);
                self.emit(EditorEvent::DocumentAutosaved(id));
                self.set_status("AUTO-SAVED");
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "autosave failed");
                self.set_status("AUTO-SAVE FAILED");
            }
        }
    }

    // ==================== Commands & Keys ====================

    /// Runs a UI intent.
    ///
    /// Path-less open and save-as commands are the front end's cue to show
    /// a panel; here they do nothing.
    pub fn execute(&mut self, command: &Command) -> CoreResult<()> {
        debug!(command = command.name(), "execute");
        match command {
            Command::NewDocument => {
                self.create_document();
            }
            Command::OpenFile { path: Some(path) } => {
                self.open_document(path)?;
            }
            Command::OpenFile { path: None } | Command::SaveAs { path: None } => {}
            Command::OpenWorkspace { path } => self.open_workspace(path)?,
            Command::RefreshWorkspace => self.refresh_workspace(),
            Command::Save => self.save_active()?,
            Command::SaveAs { path: Some(path) } => {
                let id = self
                    .documents
                    .active_id()
                    .ok_or(CoreError::NoActiveDocument)?;
                self.save_as(id, path)?;
            }
            Command::SaveAll => self.save_all()?,
            Command::CloseDocument => {
                let id = self
                    .documents
                    .active_id()
                    .ok_or(CoreError::NoActiveDocument)?;
                self.close_document(id)?;
            }

            Command::Bold => {
                self.bold();
            }
            Command::Italic => {
                self.italic();
            }
            Command::InlineCode => {
                self.inline_code();
            }
            Command::Heading => {
                self.heading();
            }
            Command::BulletList => {
                self.bullet_list();
            }
            Command::Quote => {
                self.quote();
            }
            Command::InsertDate => {
                self.insert_date_stamp();
            }

            Command::GoToLine { line } => self.go_to_line(*line),
            Command::ShowGoToLine => self.update_view(|v| v.show_go_to_line = true),
            Command::QuickOpen => self.update_view(|v| v.show_quick_open = true),
            Command::Find => self.update_view(|v| v.show_find = true),

            Command::ToggleSidebar => self.update_view(|v| v.show_sidebar = !v.show_sidebar),
            Command::ToggleInspector => {
                self.update_view(|v| v.show_inspector = !v.show_inspector)
            }
            Command::TogglePreview => self.update_view(|v| v.show_preview = !v.show_preview),
            Command::ToggleFocusMode => self.update_view(ViewState::toggle_focus_mode),
            Command::ToggleTypewriter => {
                self.update_view(|v| v.typewriter_mode = !v.typewriter_mode)
            }
            Command::ToggleLineNumbers => {
                self.update_view(|v| v.show_line_numbers = !v.show_line_numbers)
            }
            Command::SetSplitMode(mode) => self.set_split_mode(*mode),
            Command::FocusPane(pane) => self.set_focused_pane(*pane),
        }
        Ok(())
    }

    /// Runs the command bound to `key`. Returns false if nothing is bound.
    pub fn handle_key(&mut self, key: &KeyPress) -> CoreResult<bool> {
        let Some(command) = self.keymap.lookup(key).cloned() else {
            return Ok(false);
        };
        self.execute(&command)?;
        Ok(true)
    }

    // ==================== View ====================

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Applies `change` to the view state and notifies subscribers.
    pub fn update_view(&mut self, change: impl FnOnce(&mut ViewState)) {
        change(&mut self.view);
        self.emit(EditorEvent::ViewChanged);
    }

    /// Progress towards the writing goal for the active document.
    pub fn goal_progress(&self) -> f64 {
        self.view.goal_progress(self.document_statistics().words)
    }

    /// Returns an immutable picture of the editor for rendering.
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            tabs: self
                .documents
                .iter()
                .map(|doc| TabSnapshot {
                    id: doc.id(),
                    name: doc.name().to_string(),
                    path: doc.path().map(Path::to_path_buf),
                    language: doc.language(),
                    dirty: doc.is_dirty(),
                })
                .collect(),
            active: self.documents.active_id(),
            panes: *self.documents.panes(),
            status: self.status.clone(),
            view: self.view.clone(),
            stats: self.document_statistics(),
            cursor: self.cursor_line_column(),
            workspace: self.workspace.as_ref().map(|ws| ws.root().to_path_buf()),
        }
    }

    // ==================== Config & Events ====================

    pub fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        info!(status = %self.status);
        self.emit(EditorEvent::StatusChanged(self.status.clone()));
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Modifiers;
    use balenciaga_buffer::utf16_len;
    use std::time::Duration;
    use tempfile::tempdir;

    fn active_text(editor: &Editor) -> String {
        editor.active_document().unwrap().text().into_owned()
    }

    #[test]
    fn test_create_document() {
        let mut editor = Editor::new();
        assert_eq!(editor.status(), "READY");
        let id = editor.create_document();
        assert_eq!(editor.documents().active_id(), Some(id));
        assert_eq!(editor.document(id).unwrap().name(), "Untitled");
        assert_eq!(editor.status(), "NEW DOCUMENT");
    }

    #[test]
    fn test_open_document_dedups_and_tracks_recent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes").unwrap();

        let mut editor = Editor::new();
        let id = editor.open_document(&path).unwrap();
        assert_eq!(editor.status(), "OPENED NOTES.MD");
        assert_eq!(editor.document(id).unwrap().language(), Language::Markdown);

        editor.create_document();
        assert_eq!(editor.open_document(&path).unwrap(), id);
        assert_eq!(editor.documents().len(), 2);
        assert_eq!(editor.documents().active_id(), Some(id));
        assert_eq!(editor.recent_files().first(), Some(path.as_path()));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let mut editor = Editor::new();
        assert!(editor.open_document(dir.path().join("missing.txt")).is_err());
        assert_eq!(editor.status(), "FAILED TO OPEN FILE");
        assert!(editor.documents().is_empty());
        assert!(editor.recent_files().is_empty());
    }

    #[test]
    fn test_save_untitled_requires_destination() {
        let mut editor = Editor::new();
        let id = editor.create_document();
        assert!(matches!(editor.save(id), Err(CoreError::NoDestination(_))));
        assert_eq!(editor.status(), "SAVE REQUIRES A DESTINATION");
    }

    #[test]
    fn test_save_with_no_active_document() {
        let mut editor = Editor::new();
        assert!(matches!(
            editor.save_active(),
            Err(CoreError::NoActiveDocument)
        ));
        assert_eq!(editor.status(), "NO ACTIVE DOCUMENT");
    }

    #[test]
    fn test_save_as_adopts_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script.py");

        let mut editor = Editor::new();
        let id = editor.create_document();
        editor
            .set_text_and_selection(id, "print('hi')\n", TextRange::caret(0))
            .unwrap();
        assert!(editor.has_unsaved_changes());

        editor.save_as(id, &path).unwrap();
        let doc = editor.document(id).unwrap();
        assert_eq!(doc.name(), "script.py");
        assert_eq!(doc.language(), Language::Python);
        assert!(!doc.is_dirty());
        assert_eq!(editor.status(), "SAVED SCRIPT.PY");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print('hi')\n");
    }

    #[test]
    fn test_save_failure_keeps_dirty() {
        let dir = tempdir().unwrap();
        let mut editor = Editor::new();
        let id = editor.create_document();
        editor
            .set_text_and_selection(id, "text", TextRange::caret(4))
            .unwrap();

        let result = editor.save_as(id, dir.path().join("no/such/dir/file.txt"));
        assert!(result.is_err());
        assert_eq!(editor.status(), "SAVE FAILED");
        let doc = editor.document(id).unwrap();
        assert!(doc.is_dirty());
        assert!(doc.path().is_none());
    }

    #[test]
    fn test_save_all_skips_untitled() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();

        let mut editor = Editor::new();
        let ida = editor.open_document(&a).unwrap();
        let idb = editor.open_document(&b).unwrap();
        editor.create_document();
        editor
            .set_text_and_selection(ida, "A", TextRange::caret(1))
            .unwrap();
        editor
            .set_text_and_selection(idb, "B", TextRange::caret(1))
            .unwrap();

        editor.save_all().unwrap();
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "A");
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "B");
    }

    #[test]
    fn test_close_last_document() {
        let mut editor = Editor::new();
        let first = editor.create_document();
        let second = editor.create_document();

        editor.close_document(second).unwrap();
        assert_eq!(editor.documents().active_id(), Some(first));

        editor.close_document(first).unwrap();
        assert_eq!(editor.documents().active_id(), None);
        assert_eq!(editor.status(), "NO DOCUMENT OPEN");
        assert!(editor.close_document(first).is_err());
    }

    #[test]
    fn test_formatting_creates_document_when_needed() {
        let mut editor = Editor::new();
        let id = editor.bold();
        assert_eq!(active_text(&editor), "****");
        assert_eq!(editor.document(id).unwrap().selection(), TextRange::caret(2));
        assert!(editor.document(id).unwrap().is_dirty());
    }

    #[test]
    fn test_formatting_commands() {
        let mut editor = Editor::new();
        let id = editor.create_document();
        editor
            .set_text_and_selection(id, "One\n\nTwo", TextRange::new(0, 8))
            .unwrap();
        editor.quote();
        assert_eq!(active_text(&editor), "> One\n\n> Two");

        editor.set_selection(id, TextRange::new(2, 3)).unwrap();
        editor.italic();
        assert_eq!(active_text(&editor), "> *One*\n\n> Two");
    }

    #[test]
    fn test_insert_date_stamp() {
        let mut editor = Editor::new();
        let id = editor.insert_date_stamp();
        let text = active_text(&editor);
        assert!(text.starts_with("\n\n") && text.ends_with("\n\n"));
        let year = chrono::Local::now().format("%Y").to_string();
        assert!(text.contains(&year));
        assert_eq!(
            editor.document(id).unwrap().selection(),
            TextRange::caret(utf16_len(&text))
        );
        assert_eq!(editor.status(), "DATE INSERTED");
    }

    #[test]
    fn test_split_mode_assigns_secondary_pane() {
        let mut editor = Editor::new();
        editor.create_document();

        editor.set_split_mode(SplitMode::Vertical);

        assert_eq!(editor.panes().mode, SplitMode::Vertical);
        assert!(editor.panes().secondary.is_some());
    }

    #[test]
    fn test_apply_completion_replaces_current_prefix() {
        let mut editor = Editor::new();
        let id = editor.create_document();
        let text = "let result = valu";
        editor
            .set_text_and_selection(id, text, TextRange::caret(utf16_len(text)))
            .unwrap();

        editor.apply_completion("value", EditorPane::Primary).unwrap();

        let doc = editor.document(id).unwrap();
        assert_eq!(doc.text(), "let result = value");
        assert_eq!(doc.selection().location, "let result = value".len());
    }

    #[test]
    fn test_apply_completion_without_tab() {
        let mut editor = Editor::new();
        assert!(
            editor
                .apply_completion("value", EditorPane::Secondary)
                .is_err()
        );
    }

    #[test]
    fn test_setting_focused_pane_switches_active() {
        let mut editor = Editor::new();
        let first = editor.create_document();
        let second = editor.create_document();
        editor.set_split_mode(SplitMode::Horizontal);

        editor.set_tab(first, EditorPane::Primary).unwrap();
        editor.set_tab(second, EditorPane::Secondary).unwrap();

        editor.set_focused_pane(EditorPane::Secondary);
        assert_eq!(editor.documents().active_id(), Some(second));

        editor.set_focused_pane(EditorPane::Primary);
        assert_eq!(editor.documents().active_id(), Some(first));
    }

    #[test]
    fn test_focus_secondary_without_split_keeps_active_tab() {
        let mut editor = Editor::new();
        let only = editor.create_document();

        editor
            .execute(&Command::FocusPane(EditorPane::Secondary))
            .unwrap();
        assert_eq!(editor.documents().active_id(), Some(only));
        assert_eq!(editor.panes().focused, EditorPane::Primary);

        assert_eq!(editor.bold(), only);
        assert_eq!(editor.documents().len(), 1);
        assert_eq!(editor.panes().secondary, None);
    }

    #[test]
    fn test_go_to_line_and_headings() {
        let mut editor = Editor::new();
        let id = editor.create_document();
        editor
            .set_text_and_selection(id, "# Title\nbody\n## Part\nmore", TextRange::caret(0))
            .unwrap();

        let headings = editor.outline_headings();
        assert_eq!(headings.len(), 2);

        editor.jump_to_heading(&headings[1]);
        assert_eq!(editor.cursor_line_column(), Some(Position::new(3, 1)));
        assert_eq!(editor.status(), "JUMPED TO LINE 3");

        editor.go_to_line(0);
        assert_eq!(editor.cursor_line_column(), Some(Position::new(3, 1)));
        assert_eq!(editor.status(), "JUMPED TO LINE 3");
    }

    #[test]
    fn test_statistics_follow_active_document() {
        let mut editor = Editor::new();
        assert_eq!(editor.document_statistics(), DocumentStats::EMPTY);

        let id = editor.create_document();
        editor
            .set_text_and_selection(id, "one two three", TextRange::caret(0))
            .unwrap();
        assert_eq!(editor.document_statistics().words, 3);
        assert_eq!(editor.snapshot().stats.words, 3);
    }

    #[test]
    fn test_focus_mode_toggle() {
        let mut editor = Editor::new();
        editor.execute(&Command::TogglePreview).unwrap();
        editor.execute(&Command::ToggleFocusMode).unwrap();
        let view = editor.view();
        assert!(view.focus_mode);
        assert!(!view.show_sidebar && !view.show_inspector && !view.show_preview);

        editor.execute(&Command::ToggleFocusMode).unwrap();
        let view = editor.view();
        assert!(view.show_sidebar && view.show_inspector);
        assert!(!view.show_preview);
    }

    #[test]
    fn test_writing_goal_clamped() {
        let mut view = ViewState::default();
        view.set_writing_goal_words(5);
        assert_eq!(view.writing_goal_words(), MIN_WRITING_GOAL);
        view.set_writing_goal_words(50_000);
        assert_eq!(view.writing_goal_words(), MAX_WRITING_GOAL);

        view.set_writing_goal_words(200);
        assert_eq!(view.goal_progress(50), 0.25);
        assert_eq!(view.goal_progress(400), 1.0);
    }

    #[test]
    fn test_handle_key_runs_bound_command() {
        let mut editor = Editor::new();
        assert!(
            editor
                .handle_key(&KeyPress::char('b', Modifiers::CMD))
                .unwrap()
        );
        assert_eq!(active_text(&editor), "****");
        assert!(
            !editor
                .handle_key(&KeyPress::char('q', Modifiers::NONE))
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_watch_workspace() {
        let mut editor = Editor::new();
        assert!(editor.watch_workspace().unwrap().is_none());

        let dir = tempdir().unwrap();
        editor.open_workspace(dir.path()).unwrap();
        assert!(editor.watch_workspace().unwrap().is_some());
        assert!(editor.workspace().unwrap().is_watching());
    }

    #[test]
    fn test_open_workspace_with_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("todo.md");
        std::fs::write(&file, "- one").unwrap();
        std::fs::write(dir.path().join("other.txt"), "").unwrap();

        let mut editor = Editor::new();
        editor.open_workspace(&file).unwrap();
        assert_eq!(editor.workspace().unwrap().file_index().len(), 2);
        assert_eq!(editor.status(), "OPENED TODO.MD");
        assert_eq!(editor.quick_open("todo").len(), 1);
        assert!(editor.workspace_file_names().contains(&"other".to_string()));

        let mut editor = Editor::new();
        editor.open_workspace(dir.path()).unwrap();
        assert_eq!(editor.status(), "WORKSPACE OPENED");
        assert!(editor.documents().is_empty());
    }

    #[test]
    fn test_snapshot() {
        let mut editor = Editor::new();
        let id = editor.create_document();
        editor
            .set_text_and_selection(id, "ab\ncd", TextRange::caret(4))
            .unwrap();
        let snapshot = editor.snapshot();
        assert_eq!(snapshot.tabs.len(), 1);
        assert!(snapshot.tabs[0].dirty);
        assert_eq!(snapshot.active, Some(id));
        assert_eq!(snapshot.status, "EDITING");
        assert_eq!(snapshot.cursor, Some(Position::new(2, 2)));
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let mut editor = Editor::new();
        let mut rx = editor.subscribe();
        let id = editor.create_document();

        assert_eq!(rx.recv().await.unwrap(), EditorEvent::DocumentOpened(id));
        assert_eq!(rx.recv().await.unwrap(), EditorEvent::DocumentFocused(id));
        assert_eq!(
            rx.recv().await.unwrap(),
            EditorEvent::StatusChanged("NEW DOCUMENT".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_writes_after_quiet_period() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("draft.md");
        std::fs::write(&path, "old").unwrap();

        let mut editor = Editor::new();
        let id = editor.open_document(&path).unwrap();
        editor
            .set_text_and_selection(id, "new", TextRange::caret(3))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(editor.poll_autosaves(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");

        assert_eq!(editor.next_autosave().await, Some(id));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(editor.status(), "AUTO-SAVED");
        assert!(!editor.document(id).unwrap().is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_skips_untitled_and_closed() {
        let mut editor = Editor::new();
        let untitled = editor.create_document();
        editor
            .set_text_and_selection(untitled, "draft", TextRange::caret(5))
            .unwrap();
        let closed = editor.create_document();
        editor
            .set_text_and_selection(closed, "gone", TextRange::caret(4))
            .unwrap();
        editor.close_document(closed).unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(editor.poll_autosaves(), 1);
        assert_eq!(editor.status(), "EDITING");
        assert!(editor.document(untitled).unwrap().is_dirty());
    }
}
