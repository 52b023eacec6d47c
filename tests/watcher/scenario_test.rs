//! End-to-end polling scenarios driven one cycle at a time.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use dirwatcher::config::{PollSettings, WatchConfig};
use dirwatcher::watcher::{PollDriver, WatcherError};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn driver_for(dir: &Path) -> PollDriver {
    let config = WatchConfig::new(dir, "ERROR", &PollSettings::default()).unwrap();
    PollDriver::new(config, CancellationToken::new())
}

fn append(path: &Path, lines: &[&str]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

fn numbered(count: usize) -> String {
    (1..=count).map(|i| format!("line {i}\n")).collect()
}

#[tokio::test]
async fn clean_file_is_tracked_without_matches() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    std::fs::write(&a, "alpha\nbeta\ngamma\n").unwrap();
    let mut driver = driver_for(dir.path());

    let report = driver.run_cycle().await.unwrap();

    assert!(report.matches.is_empty());
    assert_eq!(report.added, vec![a.clone()]);
    assert_eq!(driver.watch_set().position(&a), Some(3));
}

#[tokio::test]
async fn appended_match_is_reported_once_at_new_line() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    std::fs::write(&a, "alpha\nbeta\ngamma\n").unwrap();
    let mut driver = driver_for(dir.path());
    driver.run_cycle().await.unwrap();

    append(&a, &["delta", "an ERROR occurred"]);
    let second = driver.run_cycle().await.unwrap();

    assert_eq!(second.matches.len(), 1);
    assert_eq!(second.matches[0].line, 5);
    assert_eq!(second.matches[0].path, a);
    assert_eq!(second.matches[0].magic, "ERROR");
    assert_eq!(driver.watch_set().position(&a), Some(5));

    // Nothing new: the same line must not be reported again.
    let third = driver.run_cycle().await.unwrap();
    assert!(third.matches.is_empty());
    assert_eq!(driver.watch_set().position(&a), Some(5));
}

#[tokio::test]
async fn removed_directory_leaves_watch_set_unchanged() {
    let root = TempDir::new().unwrap();
    let watched = root.path().join("watched");
    std::fs::create_dir(&watched).unwrap();
    let a = watched.join("a.txt");
    std::fs::write(&a, "one\ntwo\nthree\n").unwrap();
    let mut driver = driver_for(&watched);
    driver.run_cycle().await.unwrap();

    std::fs::remove_dir_all(&watched).unwrap();
    let result = driver.run_cycle().await;

    assert!(matches!(
        result,
        Err(WatcherError::DirectoryUnavailable { .. })
    ));
    assert_eq!(driver.watch_set().len(), 1);
    assert_eq!(driver.watch_set().position(&a), Some(3));

    std::fs::create_dir(&watched).unwrap();
    std::fs::write(&a, "one\ntwo\nthree\nERROR four\n").unwrap();
    let resumed = driver.run_cycle().await.unwrap();

    assert!(resumed.added.is_empty());
    assert_eq!(resumed.matches.len(), 1);
    assert_eq!(resumed.matches[0].line, 4);
    assert_eq!(driver.watch_set().position(&a), Some(4));
}

#[tokio::test]
async fn non_matching_extension_is_never_tracked() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "fine\n").unwrap();
    let mut driver = driver_for(dir.path());
    driver.run_cycle().await.unwrap();

    let log = dir.path().join("b.log");
    std::fs::write(&log, "ERROR\nERROR\n").unwrap();
    let report = driver.run_cycle().await.unwrap();

    assert!(report.added.is_empty());
    assert!(report.matches.is_empty());
    assert!(!driver.watch_set().contains(&log));
    assert_eq!(driver.watch_set().len(), 1);
}

#[tokio::test]
async fn new_file_is_scanned_from_first_line() {
    let dir = TempDir::new().unwrap();
    let mut driver = driver_for(dir.path());
    driver.run_cycle().await.unwrap();
    assert!(driver.watch_set().is_empty());

    let b = dir.path().join("b.txt");
    std::fs::write(&b, "ERROR at start\nok\nERROR again\n").unwrap();
    let report = driver.run_cycle().await.unwrap();

    assert_eq!(report.added, vec![b.clone()]);
    let lines: Vec<u64> = report.matches.iter().map(|m| m.line).collect();
    assert_eq!(lines, vec![1, 3]);
    assert_eq!(driver.watch_set().position(&b), Some(3));
}

#[tokio::test]
async fn deleted_file_is_dropped_without_errors() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    std::fs::write(&a, "x\n").unwrap();
    std::fs::write(&b, "y\n").unwrap();
    let mut driver = driver_for(dir.path());
    driver.run_cycle().await.unwrap();

    std::fs::remove_file(&a).unwrap();
    let report = driver.run_cycle().await.unwrap();

    assert_eq!(report.removed, vec![a.clone()]);
    assert!(report.unreadable.is_empty());
    assert_eq!(report.scanned, 1);
    assert!(!driver.watch_set().contains(&a));

    let after = driver.run_cycle().await.unwrap();
    assert!(after.removed.is_empty());
    assert!(after.unreadable.is_empty());
}

#[tokio::test]
async fn truncated_file_is_clamped() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    std::fs::write(&a, numbered(50)).unwrap();
    let mut driver = driver_for(dir.path());
    driver.run_cycle().await.unwrap();
    assert_eq!(driver.watch_set().position(&a), Some(50));

    std::fs::write(&a, numbered(10)).unwrap();
    let report = driver.run_cycle().await.unwrap();

    assert_eq!(report.truncated, vec![a.clone()]);
    assert_eq!(driver.watch_set().position(&a), Some(10));

    // Growth after the clamp is picked up from line 11.
    append(&a, &["ERROR after rotation"]);
    let grown = driver.run_cycle().await.unwrap();
    assert_eq!(grown.matches.len(), 1);
    assert_eq!(grown.matches[0].line, 11);
}

#[tokio::test]
async fn repeated_appends_never_duplicate_reports() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    std::fs::write(&a, "").unwrap();
    let mut driver = driver_for(dir.path());

    let mut reported: Vec<u64> = Vec::new();
    for round in 0..5 {
        let line = format!("ERROR round {round}");
        append(&a, &["quiet", line.as_str()]);
        let report = driver.run_cycle().await.unwrap();
        reported.extend(report.matches.iter().map(|m| m.line));
        assert_eq!(driver.watch_set().position(&a), Some((round + 1) * 2));
    }

    assert_eq!(reported, vec![2, 4, 6, 8, 10]);
    assert_eq!(driver.stats().matches, 5);
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_file_keeps_position_and_others_still_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked.txt");
    let open = dir.path().join("open.txt");
    std::fs::write(&locked, "a\nb\n").unwrap();
    std::fs::write(&open, "c\n").unwrap();
    let mut driver = driver_for(dir.path());
    driver.run_cycle().await.unwrap();

    append(&locked, &["ERROR hidden"]);
    append(&open, &["ERROR visible"]);
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores file permissions; nothing to assert in that case.
    if std::fs::File::open(&locked).is_ok() {
        return;
    }

    let report = driver.run_cycle().await.unwrap();

    assert_eq!(report.unreadable, vec![locked.clone()]);
    assert_eq!(driver.watch_set().position(&locked), Some(2));
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].path, open);
    assert_eq!(driver.stats().unreadable, 1);

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
    let recovered = driver.run_cycle().await.unwrap();
    assert_eq!(recovered.matches.len(), 1);
    assert_eq!(recovered.matches[0].line, 3);
    assert_eq!(recovered.matches[0].path, PathBuf::from(&locked));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn failing_read_keeps_position_regardless_of_privileges() {
    let dir = TempDir::new().unwrap();
    let flaky = dir.path().join("flaky.txt");
    let steady = dir.path().join("steady.txt");
    std::fs::write(&flaky, "a\nb\n").unwrap();
    std::fs::write(&steady, "c\n").unwrap();
    let mut driver = driver_for(dir.path());
    driver.run_cycle().await.unwrap();

    // A regular file per metadata whose read fails with EIO, even for root.
    std::fs::remove_file(&flaky).unwrap();
    std::os::unix::fs::symlink("/proc/self/mem", &flaky).unwrap();
    append(&steady, &["ERROR visible"]);

    let report = driver.run_cycle().await.unwrap();

    assert!(report.removed.is_empty());
    assert_eq!(report.unreadable, vec![flaky.clone()]);
    assert_eq!(driver.watch_set().position(&flaky), Some(2));
    assert_eq!(report.scanned, 1);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].path, steady);
    assert_eq!(report.matches[0].line, 2);
    assert_eq!(driver.stats().unreadable, 1);

    std::fs::remove_file(&flaky).unwrap();
    std::fs::write(&flaky, "a\nb\nERROR after recovery\n").unwrap();
    let recovered = driver.run_cycle().await.unwrap();

    assert!(recovered.unreadable.is_empty());
    assert_eq!(recovered.matches.len(), 1);
    assert_eq!(recovered.matches[0].path, flaky);
    assert_eq!(recovered.matches[0].line, 3);
    assert_eq!(driver.watch_set().position(&flaky), Some(3));
}

#[cfg(unix)]
#[tokio::test]
async fn non_utf8_file_name_is_tracked_and_scanned() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = TempDir::new().unwrap();
    let odd = dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
    if std::fs::write(&odd, "ERROR\n").is_err() {
        // Some filesystems reject non UTF-8 names outright.
        return;
    }
    let mut driver = driver_for(dir.path());

    let report = driver.run_cycle().await.unwrap();

    assert_eq!(report.added, vec![odd.clone()]);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].path, odd);
    assert_eq!(driver.watch_set().position(&odd), Some(1));
}
