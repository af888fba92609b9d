//! # Stop flag and loop-owned state.
//!
//! - [`StopHandle`]: monotonic `stopping` flag shared with the host (false → true, never reset).
//! - [`SupervisorState`]: values owned by `Supervisor::run` alone and threaded
//!   through the loop explicitly; nothing else reads or writes them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::shutdown;
use crate::policies::WarningCounters;

/// Host-supplied stop function. It is expected to (eventually) call [`StopHandle::stop`].
pub type StopHook = Arc<dyn Fn() + Send + Sync>;

/// Cloneable handle to the supervisor's stop flag.
///
/// Backed by a [`CancellationToken`], so the flag is monotonic and waiters can
/// suspend on it instead of polling.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Creates a handle in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Idempotent.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("stop requested");
        }
        self.token.cancel();
    }

    /// Returns `true` once a stop has been requested.
    pub fn is_stopping(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when a stop is requested.
    pub async fn stopped(&self) {
        self.token.cancelled().await
    }

    /// Token that is cancelled together with this handle (for background tasks).
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Spawns a listener that requests a stop on SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere).
    ///
    /// Must be called from within a tokio runtime.
    pub fn stop_on_signal(&self) -> JoinHandle<()> {
        let me = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                res = shutdown::wait_for_shutdown_signal() => {
                    match res {
                        Ok(()) => tracing::info!("termination signal received"),
                        Err(e) => tracing::error!(error = %e, "signal registration failed; stopping"),
                    }
                    me.stop();
                }
                _ = me.stopped() => {}
            }
        })
    }
}

/// State owned exclusively by the supervisor's control flow.
#[derive(Clone, Copy, Debug)]
pub struct SupervisorState {
    booted_at: DateTime<Utc>,
    /// Starvation counters carried from one tick to the next.
    pub counters: WarningCounters,
    /// Number of ticks started so far.
    pub ticks: u64,
}

impl SupervisorState {
    /// Creates the state at the end of bootstrap. `booted_at` cannot change afterwards.
    pub fn new(booted_at: DateTime<Utc>) -> Self {
        Self {
            booted_at,
            counters: WarningCounters::default(),
            ticks: 0,
        }
    }

    /// Scheduler time recorded during bootstrap.
    pub fn booted_at(&self) -> DateTime<Utc> {
        self.booted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_is_monotonic_and_shared() {
        let a = StopHandle::new();
        let b = a.clone();
        let child = a.child_token();
        assert!(!b.is_stopping());

        a.stop();
        a.stop();
        assert!(b.is_stopping());
        assert!(child.is_cancelled());
        b.stopped().await;
    }

    #[tokio::test]
    async fn signal_listener_exits_when_stopped_elsewhere() {
        let stop = StopHandle::new();
        let listener = stop.stop_on_signal();
        stop.stop();
        listener.await.unwrap();
    }
}
