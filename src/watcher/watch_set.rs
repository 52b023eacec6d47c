//! Tracked files and their read positions.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// A file being watched for magic text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchedFile {
    /// Number of lines already read and checked.
    pub last_scanned_line: u64,
}

/// Files added and removed by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl Reconciliation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Mapping of tracked file paths to their last scanned line.
///
/// Membership only changes through [`WatchSet::reconcile`]; positions only
/// change through [`WatchSet::record_position`].
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    files: HashMap<PathBuf, WatchedFile>,
}

impl WatchSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Last scanned line for `path`, or `None` if it is not tracked.
    #[must_use]
    pub fn position(&self, path: &Path) -> Option<u64> {
        self.files.get(path).map(|f| f.last_scanned_line)
    }

    /// Tracked paths in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Store the line count returned by a successful scan.
    ///
    /// Returns `false` and changes nothing if `path` is not tracked.
    pub fn record_position(&mut self, path: &Path, total_lines: u64) -> bool {
        match self.files.get_mut(path) {
            Some(file) => {
                file.last_scanned_line = total_lines;
                true
            }
            None => false,
        }
    }

    /// Bring membership in line with the current directory listing.
    ///
    /// New paths start at line 0. Paths missing from `listing` are dropped.
    /// Paths present in both keep their position.
    pub fn reconcile(&mut self, listing: &BTreeSet<PathBuf>) -> Reconciliation {
        let mut removed: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|path| !listing.contains(*path))
            .cloned()
            .collect();
        removed.sort();
        for path in &removed {
            self.files.remove(path);
            tracing::info!(path = %path.display(), "Removed deleted file");
        }

        let mut added = Vec::new();
        for path in listing {
            if self.files.contains_key(path) {
                continue;
            }
            self.files.insert(path.clone(), WatchedFile::default());
            tracing::info!(path = %path.display(), "Watching new file");
            added.push(path.clone());
        }

        Reconciliation { added, removed }
    }
}
