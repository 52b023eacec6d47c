//! Watcher module tests.

mod scenario_test;

/// Verify all public watcher types are exported from the library.
#[test]
fn test_all_watcher_types_exported() {
    use dirwatcher::watcher::{
        CycleReport, DriverState, DriverStateMachine, DriverStats, MagicMatch, Reconciliation,
        ScanOutcome, WatchSet, WatchedFile, WatcherError,
    };

    let _ = WatchSet::new();
    let _ = DriverStateMachine::new();
    let _ = WatchedFile::default();
    let _ = Reconciliation::default();
    let _ = ScanOutcome::default();
    let _ = CycleReport::default();
    let _ = DriverStats::default();
    let _: fn() -> WatcherError = || WatcherError::Io(std::io::Error::other("x"));
    let _ = MagicMatch {
        path: "/tmp/a.txt".into(),
        line: 1,
        magic: "ERROR".to_string(),
    };
    let _ = DriverState::Idle;
}
