//! Translate SIGINT/SIGTERM into a stop request.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wait for the first termination signal and return its name.
///
/// # Errors
///
/// Returns an error if a signal handler cannot be registered.
#[cfg(unix)]
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigint.recv() => Ok("SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

/// Wait for the first termination signal and return its name.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be registered.
#[cfg(not(unix))]
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("SIGINT")
}

/// Cancel `stop` when a termination signal arrives.
///
/// If handlers cannot be installed the error is logged and `stop` is left
/// alone, so the process can still be killed the hard way.
#[must_use]
pub fn spawn_stop_listener(stop: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = stop.cancelled() => {}
            received = wait_for_termination() => match received {
                Ok(name) => {
                    tracing::warn!(signal = name, "Received signal, stopping");
                    stop.cancel();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handlers");
                }
            },
        }
    })
}
