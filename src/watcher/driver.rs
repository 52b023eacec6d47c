//! Poll driver: reconcile and scan once per interval until stopped.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use tokio_util::sync::CancellationToken;

use super::discovery::list_matching_files;
use super::error::WatcherError;
use super::scanner::{scan_file, MagicMatch};
use super::state::{DriverState, DriverStateMachine, DriverStats};
use super::watch_set::WatchSet;
use crate::config::WatchConfig;
use crate::display;

/// What happened during one successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Files that started being tracked.
    pub added: Vec<PathBuf>,
    /// Files that stopped being tracked.
    pub removed: Vec<PathBuf>,
    /// Number of files scanned successfully.
    pub scanned: usize,
    /// Files skipped because they could not be read.
    pub unreadable: Vec<PathBuf>,
    /// Files that had fewer lines than previously scanned.
    pub truncated: Vec<PathBuf>,
    /// Magic text found in newly scanned lines.
    pub matches: Vec<MagicMatch>,
}

/// Final report returned when the driver stops.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub stopped_at: DateTime<Local>,
    pub stats: DriverStats,
    pub final_state: DriverState,
    /// Files still tracked at shutdown.
    pub tracked_files: usize,
}

impl RunSummary {
    #[must_use]
    pub fn uptime(&self) -> TimeDelta {
        self.stopped_at - self.started_at
    }
}

/// Owns the watch set and runs polling cycles.
#[derive(Debug)]
pub struct PollDriver {
    config: WatchConfig,
    watch_set: WatchSet,
    machine: DriverStateMachine,
    stop: CancellationToken,
}

impl PollDriver {
    /// Create a driver that runs until `stop` is cancelled.
    #[must_use]
    pub fn new(config: WatchConfig, stop: CancellationToken) -> Self {
        Self {
            config,
            watch_set: WatchSet::new(),
            machine: DriverStateMachine::new(),
            stop,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    #[must_use]
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    #[must_use]
    pub fn state(&self) -> DriverState {
        self.machine.state()
    }

    #[must_use]
    pub fn stats(&self) -> DriverStats {
        self.machine.stats()
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Run one reconciliation and scan pass.
    ///
    /// Unreadable files are logged and left at their previous position;
    /// they do not fail the cycle.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::DirectoryUnavailable`] if the directory cannot
    /// be listed, in which case the watch set is left untouched, or another
    /// [`WatcherError`] for unexpected I/O failures.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, WatcherError> {
        let listing = list_matching_files(&self.config.directory, &self.config.extension).await?;
        let reconciliation = self.watch_set.reconcile(&listing);
        if !reconciliation.is_empty() {
            tracing::debug!(tracked = self.watch_set.len(), "Watch set changed");
        }

        let mut report = CycleReport {
            added: reconciliation.added,
            removed: reconciliation.removed,
            ..CycleReport::default()
        };

        for path in self.watch_set.paths() {
            let skip = self.watch_set.position(&path).unwrap_or(0);
            match scan_file(&path, skip, &self.config.magic).await {
                Ok(outcome) => {
                    if outcome.truncated {
                        tracing::warn!(
                            path = %path.display(),
                            previous = skip,
                            current = outcome.total_lines,
                            "File shrank, resetting position"
                        );
                        report.truncated.push(path.clone());
                    }
                    for hit in &outcome.matches {
                        tracing::info!(
                            path = %hit.path.display(),
                            line = hit.line,
                            magic = %hit.magic,
                            "Found magic text"
                        );
                    }
                    self.watch_set.record_position(&path, outcome.total_lines);
                    self.machine.record_matches(outcome.matches.len());
                    report.matches.extend(outcome.matches);
                    report.scanned += 1;
                }
                Err(e) if e.is_per_file() => {
                    tracing::error!(error = %e, "Skipping unreadable file this cycle");
                    self.machine.record_unreadable();
                    report.unreadable.push(path);
                }
                Err(e) => return Err(e),
            }
        }

        self.machine.record_cycle();
        Ok(report)
    }

    /// Poll until the stop token is cancelled, then return a summary.
    ///
    /// Each cycle is preceded by the configured interval. A failed cycle is
    /// followed by the backoff pause. Both pauses end early on stop.
    pub async fn run(mut self) -> RunSummary {
        let started_at = Local::now();
        display::log_start(&started_at, &self.config);

        loop {
            if self.is_stop_requested() {
                break;
            }
            if !self.pause(self.config.interval).await {
                break;
            }

            self.machine.transition(DriverState::Polling);
            match self.run_cycle().await {
                Ok(_) => {
                    self.machine.transition(DriverState::Idle);
                }
                Err(e) => {
                    self.machine.record_failed_cycle();
                    match &e {
                        WatcherError::DirectoryUnavailable { path, .. } => tracing::error!(
                            directory = %path.display(),
                            error = %e,
                            "Directory unavailable, backing off"
                        ),
                        _ => tracing::error!(error = %e, "Unexpected error during cycle, backing off"),
                    }
                    self.machine.transition(DriverState::Backoff);
                    if !self.pause(self.config.backoff).await {
                        break;
                    }
                    self.machine.transition(DriverState::Idle);
                }
            }
        }

        self.machine.transition(DriverState::Stopping);
        self.machine.transition(DriverState::Stopped);

        let summary = RunSummary {
            started_at,
            stopped_at: Local::now(),
            stats: self.machine.stats(),
            final_state: self.machine.state(),
            tracked_files: self.watch_set.len(),
        };
        display::log_stop(&summary);
        summary
    }

    /// Sleep for `duration`, returning `false` if stop was requested first.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;

            () = self.stop.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }
}
