//! Incremental line scanner.
//!
//! Reads only the lines appended past a known line count and reports the
//! ones containing the magic text.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::error::WatcherError;

/// A line containing the magic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicMatch {
    /// File the line was found in.
    pub path: PathBuf,
    /// 1-based line number.
    pub line: u64,
    /// The magic text that matched.
    pub magic: String,
}

/// Result of scanning one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Total number of lines in the file at the time of the read.
    pub total_lines: u64,
    /// Matches found past the skip point, in line order.
    pub matches: Vec<MagicMatch>,
    /// The file now has fewer lines than were previously scanned.
    pub truncated: bool,
}

/// Scan `path` for `magic`, skipping the first `skip_lines` lines.
///
/// Lines are counted from 1 and end at `\n`, `\r\n` or a bare `\r`. A
/// final segment without a line ending counts as a line. Each remaining
/// line is decoded lossily and tested with a literal, case-sensitive
/// substring check, producing at most one match per line.
///
/// If the file has fewer than `skip_lines` lines, nothing is checked and
/// the smaller count is returned with `truncated` set.
///
/// # Errors
///
/// Returns [`WatcherError::FileUnreadable`] if the file cannot be opened or
/// a read fails partway through.
pub async fn scan_file(
    path: &Path,
    skip_lines: u64,
    magic: &str,
) -> Result<ScanOutcome, WatcherError> {
    let unreadable = |source| WatcherError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).await.map_err(unreadable)?;
    let mut reader = BufReader::new(file);

    let mut outcome = ScanOutcome::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let bytes_read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(unreadable)?;
        if bytes_read == 0 {
            break;
        }

        for line in line_segments(&buf) {
            outcome.total_lines += 1;
            if outcome.total_lines <= skip_lines {
                continue;
            }

            if String::from_utf8_lossy(line).contains(magic) {
                outcome.matches.push(MagicMatch {
                    path: path.to_path_buf(),
                    line: outcome.total_lines,
                    magic: magic.to_string(),
                });
            }
        }
    }

    outcome.truncated = outcome.total_lines < skip_lines;
    Ok(outcome)
}

/// Split a `\n`-terminated chunk further at bare `\r` line endings.
fn line_segments(chunk: &[u8]) -> Vec<&[u8]> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, &byte) in chunk.iter().enumerate() {
        if byte == b'\r' && chunk.get(i + 1) != Some(&b'\n') {
            segments.push(&chunk[start..=i]);
            start = i + 1;
        }
    }
    if start < chunk.len() {
        segments.push(&chunk[start..]);
    }
    segments
}
