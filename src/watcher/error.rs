//! Watcher error types.

use std::path::PathBuf;

/// Errors that can occur while listing the directory or scanning files.
#[derive(thiserror::Error, Debug)]
pub enum WatcherError {
    /// The watched directory could not be listed.
    #[error("Directory not found or unreadable: {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A tracked file could not be opened or read.
    #[error("Cannot read file {path}: {source}")]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Any other I/O failure during a cycle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatcherError {
    /// Whether this error affects a single file rather than the whole cycle.
    #[must_use]
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::FileUnreadable { .. })
    }
}
