//! # Readiness gate.
//!
//! Startup barrier: nothing runs before every plugin is initialized and the metadata
//! needed to start (time zone, location, ...) is present.
//!
//! ```text
//! wait_for_plugins() ──false──► PluginsUnavailable
//!        │ (or stop requested while waiting ──► Interrupted)
//!        ▼ true
//! required_meta_check() ──false──► MetadataMissing
//!        ▼ true
//!      Ready
//! ```
//!
//! A non-`Ready` outcome is an expected operational condition, not an error: the
//! supervisor answers it with a controlled stop.

use crate::core::state::StopHandle;
use crate::events::{Bus, Event, EventKind};
use crate::runtime::Plugins;

/// Result of the readiness gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Plugins ready and metadata present.
    Ready,
    /// Plugins ready but required metadata is missing.
    MetadataMissing,
    /// The plugin layer reported it could not become ready.
    PluginsUnavailable,
    /// A stop was requested while waiting for plugins.
    Interrupted,
}

impl ReadyOutcome {
    /// Short stable label (snake_case) for logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            ReadyOutcome::Ready => "ready",
            ReadyOutcome::MetadataMissing => "metadata_missing",
            ReadyOutcome::PluginsUnavailable => "plugins_unavailable",
            ReadyOutcome::Interrupted => "interrupted",
        }
    }
}

/// Suspends until plugins are ready, then validates required metadata.
pub async fn await_ready(plugins: &dyn Plugins, stop: &StopHandle, bus: &Bus) -> ReadyOutcome {
    tracing::debug!("waiting for plugins");

    let ready = tokio::select! {
        ready = plugins.wait_for_plugins() => ready,
        _ = stop.stopped() => {
            return report(ReadyOutcome::Interrupted, bus);
        }
    };
    if !ready {
        return report(ReadyOutcome::PluginsUnavailable, bus);
    }
    if !plugins.required_meta_check().await {
        return report(ReadyOutcome::MetadataMissing, bus);
    }
    report(ReadyOutcome::Ready, bus)
}

fn report(outcome: ReadyOutcome, bus: &Bus) -> ReadyOutcome {
    match outcome {
        ReadyOutcome::Ready => {
            tracing::debug!("plugins ready, required metadata present");
            bus.publish(Event::new(EventKind::RuntimeReady));
        }
        ReadyOutcome::Interrupted => {
            tracing::info!("stop requested while waiting for plugins");
            bus.publish(Event::new(EventKind::ReadinessFailed).with_reason(outcome.as_label()));
        }
        _ => {
            tracing::warn!(outcome = outcome.as_label(), "readiness gate failed; stopping");
            bus.publish(Event::new(EventKind::ReadinessFailed).with_reason(outcome.as_label()));
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Gate {
        ready: bool,
        meta: bool,
        hang: bool,
    }

    #[async_trait]
    impl Plugins for Gate {
        async fn wait_for_plugins(&self) -> bool {
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.ready
        }
        async fn required_meta_check(&self) -> bool {
            self.meta
        }
        async fn update_plugin_state(&self) -> Result<(), OpError> {
            Ok(())
        }
        async fn run_plugin_utility(&self) -> Result<(), OpError> {
            Ok(())
        }
    }

    async fn outcome(ready: bool, meta: bool) -> ReadyOutcome {
        let gate = Gate {
            ready,
            meta,
            hang: false,
        };
        await_ready(&gate, &StopHandle::new(), &Bus::new(4)).await
    }

    #[tokio::test]
    async fn outcomes() {
        assert_eq!(outcome(true, true).await, ReadyOutcome::Ready);
        assert_eq!(outcome(true, false).await, ReadyOutcome::MetadataMissing);
        assert_eq!(outcome(false, true).await, ReadyOutcome::PluginsUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_the_wait() {
        let gate = Gate {
            ready: true,
            meta: true,
            hang: true,
        };
        let stop = StopHandle::new();
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();

        let s = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            s.stop();
        });

        assert_eq!(
            await_ready(&gate, &stop, &bus).await,
            ReadyOutcome::Interrupted
        );
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::ReadinessFailed);
        assert_eq!(ev.reason.as_deref(), Some("interrupted"));
    }
}
