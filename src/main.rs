//! dirwatcher - Watch a directory for magic text appended to files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dirwatcher::config::{ConfigError, ConfigLoader, PollSettings, WatchConfig};
use dirwatcher::signals::spawn_stop_listener;
use dirwatcher::watcher::PollDriver;

#[derive(Parser)]
#[command(
    name = "dirwatcher",
    about = "Watch a directory for magic text appended to files",
    version
)]
struct Cli {
    /// Directory to watch.
    path: PathBuf,

    /// Text to watch for.
    magic: String,

    /// File extension to watch [default: .txt].
    #[arg(short, long)]
    ext: Option<String>,

    /// Seconds between polls, fractions allowed [default: 1.0].
    #[arg(short, long)]
    interval: Option<f64>,

    /// Seconds to pause after a failed poll [default: 5.0].
    #[arg(long)]
    backoff: Option<f64>,

    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn resolve(self) -> Result<WatchConfig, ConfigError> {
        let loader = match self.config {
            Some(path) => ConfigLoader::with_path(path),
            None => ConfigLoader::new(),
        };
        match loader.find_config_file() {
            Some(path) => tracing::info!(path = %path.display(), "Using config file"),
            None => tracing::debug!(searched = ?loader.search_paths(), "No config file found"),
        }
        let file_settings = loader.load()?;

        let settings = PollSettings {
            extension: self.ext.unwrap_or(file_settings.extension),
            interval_secs: self.interval.unwrap_or(file_settings.interval_secs),
            backoff_secs: self.backoff.unwrap_or(file_settings.backoff_secs),
        };
        WatchConfig::new(&self.path, self.magic, &settings)
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    let stop = CancellationToken::new();
    let listener = spawn_stop_listener(stop.clone());

    PollDriver::new(config, stop.clone()).run().await;

    stop.cancel();
    if let Err(e) = listener.await {
        tracing::warn!(error = %e, "Signal listener task failed");
    }
    ExitCode::SUCCESS
}
