//! Directory watcher core.
//!
//! Tracks per-file read positions, reconciles them against the watched
//! directory, and scans appended lines for magic text.

mod discovery;
mod driver;
mod error;
mod scanner;
mod state;
mod watch_set;

pub use discovery::{has_extension, list_matching_files};
pub use driver::{CycleReport, PollDriver, RunSummary};
pub use error::WatcherError;
pub use scanner::{scan_file, MagicMatch, ScanOutcome};
pub use state::{DriverState, DriverStateMachine, DriverStats};
pub use watch_set::{Reconciliation, WatchSet, WatchedFile};
