//! Configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::ConfigError;

/// Poll settings that may come from a config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// File name suffix to watch.
    pub extension: String,
    /// Seconds between polling cycles.
    pub interval_secs: f64,
    /// Seconds to pause after a failed cycle.
    pub backoff_secs: f64,
}

fn default_extension() -> String {
    ".txt".to_string()
}

fn default_interval_secs() -> f64 {
    1.0
}

fn default_backoff_secs() -> f64 {
    5.0
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            interval_secs: default_interval_secs(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

/// Fully resolved configuration for the watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    /// Absolute path of the watched directory.
    pub directory: PathBuf,
    /// Text searched for in appended lines.
    pub magic: String,
    /// File name suffix to watch.
    pub extension: String,
    /// Pause between cycles.
    pub interval: Duration,
    /// Pause after a failed cycle.
    pub backoff: Duration,
}

impl WatchConfig {
    /// Build a validated config from a directory, magic text and settings.
    ///
    /// Relative directories are resolved against the current working
    /// directory. The directory does not need to exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the magic text or extension is
    /// empty, or an interval is not a positive finite number of seconds.
    pub fn new(
        directory: &Path,
        magic: impl Into<String>,
        settings: &PollSettings,
    ) -> Result<Self, ConfigError> {
        let magic = magic.into();
        if magic.is_empty() {
            return Err(ConfigError::Invalid("magic text must not be empty".into()));
        }
        if settings.extension.is_empty() {
            return Err(ConfigError::Invalid("extension must not be empty".into()));
        }

        let interval = seconds("interval", settings.interval_secs)?;
        let backoff = seconds("backoff", settings.backoff_secs)?;

        let directory = std::path::absolute(directory).map_err(|e| {
            ConfigError::Invalid(format!(
                "cannot resolve directory {}: {e}",
                directory.display()
            ))
        })?;

        Ok(Self {
            directory,
            magic,
            extension: settings.extension.clone(),
            interval,
            backoff,
        })
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration, ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{name} must be a positive number of seconds, got {value}"
        )));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| ConfigError::Invalid(format!("{name} out of range: {e}")))
}
