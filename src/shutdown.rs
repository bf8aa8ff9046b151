//! # Process shutdown wiring.
//!
//! Everything long-lived in the daemon (scheduler loop, message mirror, HTTP
//! server) stops through one [`CancellationToken`]. This module owns the
//! other end of that token: [`trip_on_signal`] spawns a listener that cancels
//! it when the process receives a termination signal.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd)
//! - `SIGQUIT` (quit signal, often used for hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Spawns a listener that cancels `cancel` on the first termination signal.
///
/// If signal registration fails the token is cancelled immediately; a daemon
/// that cannot be stopped cleanly should not keep running.
pub fn trip_on_signal(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => info!("termination signal received"),
            Err(err) => error!(error = %err, "signal listener failed; shutting down"),
        }
        cancel.cancel();
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
