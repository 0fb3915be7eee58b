//! Most-recently-used file list.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Default number of entries kept.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Paths of recently opened or saved files, most recent first.
#[derive(Debug, Clone)]
pub struct RecentFiles {
    entries: VecDeque<PathBuf>,
    limit: usize,
}

impl RecentFiles {
    /// Creates an empty list holding at most `limit` paths.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit: limit.max(1),
        }
    }

    /// Moves `path` to the front, dropping any older copy and trimming to
    /// the limit.
    pub fn push(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.entries.retain(|p| p != path);
        self.entries.push_front(path.to_path_buf());
        self.entries.truncate(self.limit);
    }

    /// Iterates from most to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    /// Returns the most recent path.
    pub fn first(&self) -> Option<&Path> {
        self.entries.front().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for RecentFiles {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}
