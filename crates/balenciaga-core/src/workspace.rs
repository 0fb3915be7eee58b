//! Workspace management: the sidebar tree and the flat file index.
//!
//! ## Learning: Recursive Ownership
//!
//! `FileNode` owns its children directly (`Vec<FileNode>`), so the whole
//! tree is one owned value. Rebuilding it means building a fresh tree and
//! swapping it in; no node ever points back at its parent.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::WorkspaceConfig;
use crate::{CoreError, CoreResult};

/// Pending change notifications before the watcher thread blocks.
const WATCH_CHANNEL_CAPACITY: usize = 100;

/// An opened folder: its indexed tree plus an optional watcher.
pub struct Workspace {
    /// Canonical root directory
    root: PathBuf,

    /// Last path component of `root`, shown as the sidebar title
    name: String,

    /// Entries skipped while indexing
    ignored: HashSet<String>,

    /// Include dot-files
    show_hidden: bool,

    /// Top-level entries of the root directory
    tree: Vec<FileNode>,

    /// Every file of the tree, in tree order
    index: Vec<PathBuf>,

    /// Kept alive for as long as changes should be reported
    watcher: Option<RecommendedWatcher>,
}

impl Workspace {
    /// Canonicalizes `path` and indexes it. Given a file, the file's
    /// folder becomes the workspace.
    pub fn open(path: impl AsRef<Path>, config: &WorkspaceConfig) -> CoreResult<Self> {
        let path = path.as_ref();
        let mut root = path
            .canonicalize()
            .map_err(|_| CoreError::FileNotFound(path.display().to_string()))?;

        if root.is_file() {
            if let Some(parent) = root.parent() {
                root = parent.to_path_buf();
            }
        }

        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Workspace")
            .to_string();

        let mut workspace = Self {
            root,
            name,
            ignored: config.ignored_names.iter().cloned().collect(),
            show_hidden: config.show_hidden,
            tree: Vec::new(),
            index: Vec::new(),
            watcher: None,
        };
        workspace.refresh();

        info!(root = %workspace.root.display(), files = workspace.index.len(), "workspace opened");
        Ok(workspace)
    }

    /// Installs a recursive watcher on the root and returns the channel
    /// it reports on. The tree is not refreshed automatically; the receiver
    /// calls [`Workspace::refresh`] when it sees fit.
    pub fn start_watching(&mut self) -> CoreResult<mpsc::Receiver<FileChange>> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);

        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    let changes = event
                        .paths
                        .into_iter()
                        .filter_map(|path| FileChange::from_kind(&event.kind, path));
                    for change in changes {
                        // Receiver dropped: the workspace was closed.
                        if tx.blocking_send(change).is_err() {
                            break;
                        }
                    }
                }
                Err(err) => warn!(error = %err, "file watcher error"),
            })?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        debug!(root = %self.root.display(), "watching workspace");
        self.watcher = Some(watcher);
        Ok(rx)
    }

    /// Returns true while a watcher is installed.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Returns the workspace root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the workspace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the top-level nodes.
    pub fn tree(&self) -> &[FileNode] {
        &self.tree
    }

    /// Returns every file in tree order.
    pub fn file_index(&self) -> &[PathBuf] {
        &self.index
    }

    /// Rebuilds the tree and the file index from disk.
    pub fn refresh(&mut self) {
        self.tree = self.build_children(&self.root);
        self.index.clear();
        collect_files(&self.tree, &mut self.index);
        debug!(files = self.index.len(), "workspace indexed");
    }

    /// Files for the quick-open list.
    ///
    /// A blank query returns the first `limit` files; otherwise files whose
    /// name contains the query, ignoring case.
    pub fn quick_open(&self, query: &str, limit: usize) -> Vec<&Path> {
        let query = query.trim().to_lowercase();
        self.index
            .iter()
            .filter(|path| {
                query.is_empty()
                    || path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .take(limit)
            .map(PathBuf::as_path)
            .collect()
    }

    /// File names without their extension, for completion.
    pub fn workspace_file_names(&self) -> Vec<String> {
        self.index
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect()
    }

    /// Returns the relative path from the workspace root.
    pub fn relative(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        path.as_ref().strip_prefix(&self.root).ok().map(PathBuf::from)
    }

    fn is_skipped(&self, name: &str) -> bool {
        self.ignored.contains(name) || (!self.show_hidden && name.starts_with('.'))
    }

    /// Reads one directory level and recurses into subdirectories.
    ///
    /// Unreadable directories yield no children.
    fn build_children(&self, dir: &Path) -> Vec<FileNode> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                return Vec::new();
            }
        };

        let mut children: Vec<FileNode> = entries
            .flatten()
            .filter(|entry| !self.is_skipped(&entry.file_name().to_string_lossy()))
            .map(|entry| {
                let path = entry.path();
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if is_dir {
                    FileNode {
                        children: self.build_children(&path),
                        path,
                        kind: NodeKind::Directory,
                    }
                } else {
                    FileNode {
                        path,
                        kind: NodeKind::File,
                        children: Vec::new(),
                    }
                }
            })
            .collect();

        // Directories first, then by name ignoring case
        children.sort_by(|a, b| match (a.kind, b.kind) {
            (NodeKind::Directory, NodeKind::File) => std::cmp::Ordering::Less,
            (NodeKind::File, NodeKind::Directory) => std::cmp::Ordering::Greater,
            _ => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        });

        children
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("files", &self.index.len())
            .field("watching", &self.watcher.is_some())
            .finish()
    }
}

fn collect_files(nodes: &[FileNode], out: &mut Vec<PathBuf>) {
    for node in nodes {
        match node.kind {
            NodeKind::File => out.push(node.path.clone()),
            NodeKind::Directory => collect_files(&node.children, out),
        }
    }
}

/// A change on disk under the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl FileChange {
    fn from_kind(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Deleted(path)),
            _ => None,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileChange::Created(p) | FileChange::Modified(p) | FileChange::Deleted(p) => p,
        }
    }
}

/// One sidebar entry. Children are sorted folders first, then by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub path: PathBuf,
    pub kind: NodeKind,
    /// Always empty for files
    pub children: Vec<FileNode>,
}

impl FileNode {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}
