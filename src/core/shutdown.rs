//! # Shutdown: OS signals and the drain sequence.
//!
//! - [`wait_for_shutdown_signal`]: completes when the process receives a termination signal.
//! - [`drain`]: runs once after the loop observes `stopping`; waits for the app layer
//!   to terminate, then stops and joins the background scheduler task.
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::runtime::Runtime;

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Background scheduler task launched during bootstrap.
pub(crate) struct BackgroundHandle {
    pub token: CancellationToken,
    pub join: JoinHandle<()>,
}

/// Drains the runtime after the loop exits.
///
/// No timeout is imposed: termination time is the app layer's responsibility.
/// A termination error is logged, not returned.
pub(crate) async fn drain(runtime: &Runtime, background: BackgroundHandle, bus: &Bus) {
    bus.publish(Event::new(EventKind::ShutdownStarted));

    if let Some(apps) = &runtime.apps {
        tracing::debug!("terminating apps");
        if let Err(e) = apps.terminate().await {
            tracing::warn!(error = %e, label = e.as_label(), "app termination failed");
        }
    }

    background.token.cancel();
    if let Err(e) = background.join.await {
        tracing::warn!(error = %e, "scheduler task did not exit cleanly");
    }

    tracing::info!("supervisor stopped");
    bus.publish(Event::new(EventKind::ShutdownCompleted));
}
