//! Command system for editor actions.
//!
//! ## Learning: The Command Pattern
//!
//! Commands encapsulate actions as values:
//! - Menu items, key bindings and scripts all produce the same `Command`
//! - They can be stored, queued or logged
//! - The controller has exactly one entry point for UI intents:
//!   [`Editor::execute`](crate::Editor::execute)

use std::path::PathBuf;

use crate::pane::{EditorPane, SplitMode};

/// Built-in editor commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // File commands
    NewDocument,
    /// `None` asks the front end for a file picker
    OpenFile { path: Option<PathBuf> },
    OpenWorkspace { path: PathBuf },
    RefreshWorkspace,
    Save,
    /// `None` asks the front end for a save panel
    SaveAs { path: Option<PathBuf> },
    SaveAll,
    CloseDocument,

    // Formatting
    Bold,
    Italic,
    InlineCode,
    Heading,
    BulletList,
    Quote,
    InsertDate,

    // Navigation
    GoToLine { line: usize },
    ShowGoToLine,
    QuickOpen,
    Find,

    // View
    ToggleSidebar,
    ToggleInspector,
    TogglePreview,
    ToggleFocusMode,
    ToggleTypewriter,
    ToggleLineNumbers,
    SetSplitMode(SplitMode),
    FocusPane(EditorPane),
}

impl Command {
    /// Commands addressable by name.
    pub const NAMED: [Command; 28] = [
        Command::NewDocument,
        Command::OpenFile { path: None },
        Command::SaveAs { path: None },
        Command::RefreshWorkspace,
        Command::Save,
        Command::SaveAll,
        Command::CloseDocument,
        Command::Bold,
        Command::Italic,
        Command::InlineCode,
        Command::Heading,
        Command::BulletList,
        Command::Quote,
        Command::InsertDate,
        Command::ShowGoToLine,
        Command::QuickOpen,
        Command::Find,
        Command::ToggleSidebar,
        Command::ToggleInspector,
        Command::TogglePreview,
        Command::ToggleFocusMode,
        Command::ToggleTypewriter,
        Command::ToggleLineNumbers,
        Command::SetSplitMode(SplitMode::Single),
        Command::SetSplitMode(SplitMode::Vertical),
        Command::SetSplitMode(SplitMode::Horizontal),
        Command::FocusPane(EditorPane::Primary),
        Command::FocusPane(EditorPane::Secondary),
    ];

    /// Returns the command's display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Command::NewDocument => "New Document",
            Command::OpenFile { .. } => "Open File",
            Command::OpenWorkspace { .. } => "Open Workspace",
            Command::RefreshWorkspace => "Refresh Workspace",
            Command::Save => "Save",
            Command::SaveAs { .. } => "Save As",
            Command::SaveAll => "Save All",
            Command::CloseDocument => "Close Document",
            Command::Bold => "Bold",
            Command::Italic => "Italic",
            Command::InlineCode => "Inline Code",
            Command::Heading => "Heading",
            Command::BulletList => "Bullet List",
            Command::Quote => "Quote",
            Command::InsertDate => "Insert Date",
            Command::GoToLine { .. } | Command::ShowGoToLine => "Go to Line",
            Command::QuickOpen => "Quick Open",
            Command::Find => "Find",
            Command::ToggleSidebar => "Toggle Sidebar",
            Command::ToggleInspector => "Toggle Inspector",
            Command::TogglePreview => "Toggle Preview",
            Command::ToggleFocusMode => "Focus Mode",
            Command::ToggleTypewriter => "Typewriter Scrolling",
            Command::ToggleLineNumbers => "Line Numbers",
            Command::SetSplitMode(SplitMode::Single) => "Single Pane",
            Command::SetSplitMode(SplitMode::Vertical) => "Split Vertically",
            Command::SetSplitMode(SplitMode::Horizontal) => "Split Horizontally",
            Command::FocusPane(EditorPane::Primary) => "Focus Primary Pane",
            Command::FocusPane(EditorPane::Secondary) => "Focus Secondary Pane",
        }
    }

    /// Returns the identifier used in key binding config, e.g. `"file.save"`.
    pub fn name(&self) -> &'static str {
        match self {
            Command::NewDocument => "file.new",
            Command::OpenFile { .. } => "file.open",
            Command::OpenWorkspace { .. } => "workspace.open",
            Command::RefreshWorkspace => "workspace.refresh",
            Command::Save => "file.save",
            Command::SaveAs { .. } => "file.save_as",
            Command::SaveAll => "file.save_all",
            Command::CloseDocument => "file.close",
            Command::Bold => "format.bold",
            Command::Italic => "format.italic",
            Command::InlineCode => "format.code",
            Command::Heading => "format.heading",
            Command::BulletList => "format.list",
            Command::Quote => "format.quote",
            Command::InsertDate => "format.date",
            Command::GoToLine { .. } => "navigate.line",
            Command::ShowGoToLine => "navigate.go_to_line",
            Command::QuickOpen => "navigate.quick_open",
            Command::Find => "edit.find",
            Command::ToggleSidebar => "view.sidebar",
            Command::ToggleInspector => "view.inspector",
            Command::TogglePreview => "view.preview",
            Command::ToggleFocusMode => "view.focus",
            Command::ToggleTypewriter => "view.typewriter",
            Command::ToggleLineNumbers => "view.line_numbers",
            Command::SetSplitMode(SplitMode::Single) => "split.single",
            Command::SetSplitMode(SplitMode::Vertical) => "split.vertical",
            Command::SetSplitMode(SplitMode::Horizontal) => "split.horizontal",
            Command::FocusPane(EditorPane::Primary) => "pane.primary",
            Command::FocusPane(EditorPane::Secondary) => "pane.secondary",
        }
    }

    /// Parses a command identifier.
    ///
    /// Commands carrying a path parse to their path-less form. Workspace
    /// opening and jumps to a given line have no name form.
    pub fn parse(name: &str) -> Option<Command> {
        let name = name.trim();
        Self::NAMED.iter().find(|cmd| cmd.name() == name).cloned()
    }

    /// Returns true if the command edits the active document's text.
    pub fn is_formatting(&self) -> bool {
        matches!(
            self,
            Command::Bold
                | Command::Italic
                | Command::InlineCode
                | Command::Heading
                | Command::BulletList
                | Command::Quote
                | Command::InsertDate
        )
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display_name() {
        assert_eq!(Command::Save.display_name(), "Save");
        assert_eq!(Command::ToggleFocusMode.to_string(), "Focus Mode");
    }

    #[test]
    fn test_parse_round_trips_named_commands() {
        for cmd in Command::NAMED.iter() {
            assert_eq!(Command::parse(cmd.name()).as_ref(), Some(cmd));
        }
        assert_eq!(
            Command::parse(" pane.primary "),
            Some(Command::FocusPane(EditorPane::Primary))
        );
        assert_eq!(
            Command::parse("file.open"),
            Some(Command::OpenFile { path: None })
        );
        assert_eq!(Command::parse("navigate.line"), None);
        assert_eq!(Command::parse("nope"), None);
    }

    #[test]
    fn test_commands_are_hashable() {
        let set: std::collections::HashSet<Command> = [
            Command::SetSplitMode(SplitMode::Vertical),
            Command::SetSplitMode(SplitMode::Vertical),
            Command::SetSplitMode(SplitMode::Single),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Command::SetSplitMode(SplitMode::Single)));
    }
}
