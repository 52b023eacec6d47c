//! Directory listing for the watched directory.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::error::WatcherError;

/// Check whether a file name ends with the configured extension.
///
/// The extension is a plain byte suffix match, so `.txt` matches
/// `notes.txt` but not `notes.TXT` or `notes.txt.bak`. Names that are not
/// valid UTF-8 are matched on their raw bytes.
///
/// # Examples
///
/// ```
/// use std::ffi::OsStr;
/// use dirwatcher::watcher::has_extension;
///
/// assert!(has_extension(OsStr::new("notes.txt"), ".txt"));
/// assert!(!has_extension(OsStr::new("notes.log"), ".txt"));
/// ```
#[must_use]
pub fn has_extension(file_name: &OsStr, extension: &str) -> bool {
    file_name
        .as_encoded_bytes()
        .ends_with(extension.as_bytes())
}

/// List the regular files in `dir` whose name ends with `extension`.
///
/// Returned paths are `dir` joined with each entry's file name, so they are
/// absolute whenever `dir` is. Subdirectories are never returned, even if
/// their name matches.
///
/// # Errors
///
/// Returns [`WatcherError::DirectoryUnavailable`] if the directory cannot be
/// opened, or [`WatcherError::Io`] if iterating its entries fails midway.
pub async fn list_matching_files(
    dir: &Path,
    extension: &str,
) -> Result<BTreeSet<PathBuf>, WatcherError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        WatcherError::DirectoryUnavailable {
            path: dir.to_path_buf(),
            source: e,
        }
    })?;

    let mut files = BTreeSet::new();
    while let Some(entry) = entries.next_entry().await? {
        if !has_extension(&entry.file_name(), extension) {
            continue;
        }

        let path = entry.path();
        // Follows symlinks; an entry removed since read_dir is simply skipped.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                files.insert(path);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping vanished entry");
            }
        }
    }

    Ok(files)
}
