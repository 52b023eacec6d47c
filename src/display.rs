//! Lifecycle banners and human-readable time formatting.

use chrono::{DateTime, Local, TimeDelta};

use crate::config::WatchConfig;
use crate::watcher::RunSummary;

/// Format a timestamp the way the start and stop banners show it.
#[must_use]
pub fn timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Format an uptime as `H:MM:SS.mmm`, prefixed with days when over 24h.
///
/// Negative durations (clock stepped backwards) are shown as zero.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use dirwatcher::display::format_uptime;
///
/// assert_eq!(format_uptime(TimeDelta::milliseconds(3_723_004)), "1:02:03.004");
/// ```
#[must_use]
pub fn format_uptime(uptime: TimeDelta) -> String {
    let total_ms = uptime.num_milliseconds().max(0);
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = (total_secs / 3600) % 24;
    let days = total_secs / 86_400;

    match days {
        0 => format!("{hours}:{mins:02}:{secs:02}.{ms:03}"),
        1 => format!("1 day, {hours}:{mins:02}:{secs:02}.{ms:03}"),
        d => format!("{d} days, {hours}:{mins:02}:{secs:02}.{ms:03}"),
    }
}

/// Log the start banner and the effective configuration.
pub fn log_start(started_at: &DateTime<Local>, config: &WatchConfig) {
    tracing::info!(
        program = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        started = %timestamp(started_at),
        "Running dirwatcher"
    );
    tracing::info!(
        directory = %config.directory.display(),
        extension = %config.extension,
        interval_secs = config.interval.as_secs_f64(),
        backoff_secs = config.backoff.as_secs_f64(),
        magic = %config.magic,
        "Watch configuration"
    );
}

/// Log the stop banner with total uptime.
pub fn log_stop(summary: &RunSummary) {
    tracing::info!(
        stopped = %timestamp(&summary.stopped_at),
        uptime = %format_uptime(summary.uptime()),
        cycles = summary.stats.cycles,
        failed_cycles = summary.stats.failed_cycles,
        matches = summary.stats.matches,
        unreadable = summary.stats.unreadable,
        tracked_files = summary.tracked_files,
        "Stopped dirwatcher"
    );
}
