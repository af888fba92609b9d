//! # Example: basic_runtime
//!
//! Runs the supervisor against in-memory collaborators and prints its events.
//!
//! Shows how to:
//! - Implement the collaborator traits ([`ThreadPool`], [`Plugins`], [`Scheduler`], ...).
//! - Load [`RuntimeConfig`] from `TICKVISOR_*` variables.
//! - Attach a custom [`Subscribe`] implementation.
//! - Stop on SIGINT/SIGTERM via [`StopHandle::stop_on_signal`](tickvisor::StopHandle::stop_on_signal).
//!
//! ## Flow
//! ```text
//! Supervisor::run()
//!     ├─► await_ready (plugins become ready after 300ms)
//!     ├─► bootstrap (threads, scheduler task, apps, admin readings)
//!     ├─► tick every TICKVISOR_TICK_DELAY_MS (every 4th plugin refresh is slow)
//!     └─► Ctrl-C ─► drain ─► exit
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug TICKVISOR_TICK_DELAY_MS=500 TICKVISOR_SLOW_OP_MS=200 \
//!     cargo run --example basic_runtime
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use tickvisor::{
    AppManager, Event, EventKind, EventSink, OpError, Plugins, RuntimeConfig, RuntimeEvent,
    Scheduler, StarvationPolicy, StateStore, Subscribe, Supervisor, ThreadPool, WarningCounters,
};

/// Prints selected supervisor events.
struct ConsoleSubscriber;

#[async_trait]
impl Subscribe for ConsoleSubscriber {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::TickFailed => println!(
                "[sub] tick {} failed in {}: {}",
                ev.tick.unwrap_or(0),
                ev.op.as_deref().unwrap_or("<unknown>"),
                ev.reason.as_deref().unwrap_or("<none>")
            ),
            EventKind::SlowOperation => println!(
                "[sub] slow:     {} took {}ms",
                ev.op.as_deref().unwrap_or("<unknown>"),
                ev.elapsed_ms.unwrap_or(0)
            ),
            EventKind::SkewExceeded => println!(
                "[sub] skew:     tick {} took {}ms (budget {}ms)",
                ev.tick.unwrap_or(0),
                ev.elapsed_ms.unwrap_or(0),
                ev.budget_ms.unwrap_or(0)
            ),
            EventKind::Booted | EventKind::ShutdownCompleted => println!("[sub] {:?}", ev.kind),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Worker pool whose queue slowly fills up.
#[derive(Default)]
struct DemoThreads {
    queued: AtomicUsize,
}

#[async_trait]
impl ThreadPool for DemoThreads {
    async fn init_admin_stats(&self) -> Result<(), OpError> {
        Ok(())
    }

    async fn create_initial_threads(&self) -> Result<(), OpError> {
        tracing::info!(workers = 4, "starting workers");
        Ok(())
    }

    async fn check_q_size(
        &self,
        counters: WarningCounters,
        policy: &StarvationPolicy,
    ) -> Result<WarningCounters, OpError> {
        let depth = self.queued.fetch_add(7, Ordering::Relaxed) % 120;
        let assessment = policy.assess(counters, depth);
        if assessment.warn {
            tracing::warn!(depth, "queue size is large, possible thread starvation");
        }
        Ok(assessment.counters)
    }

    async fn check_overdue_and_dead_threads(&self) -> Result<(), OpError> {
        Ok(())
    }
}

/// Plugin layer that becomes ready after a short delay.
#[derive(Default)]
struct DemoPlugins {
    refreshes: AtomicU64,
}

#[async_trait]
impl Plugins for DemoPlugins {
    async fn wait_for_plugins(&self) -> bool {
        tokio::time::sleep(Duration::from_millis(300)).await;
        true
    }

    async fn required_meta_check(&self) -> bool {
        true
    }

    async fn update_plugin_state(&self) -> Result<(), OpError> {
        let n = self.refreshes.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 4 == 0 {
            tokio::time::sleep(Duration::from_millis(350)).await;
        }
        if n % 10 == 0 {
            return Err(OpError::unavailable("demo-plugin"));
        }
        Ok(())
    }

    async fn run_plugin_utility(&self) -> Result<(), OpError> {
        Ok(())
    }
}

struct DemoApps;

#[async_trait]
impl AppManager for DemoApps {
    async fn check_app_updates(&self) -> Result<(), OpError> {
        Ok(())
    }

    async fn terminate(&self) -> Result<(), OpError> {
        tracing::info!("terminating apps");
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    }
}

/// Wall-clock scheduler whose tick task idles until cancelled.
struct DemoScheduler;

#[async_trait]
impl Scheduler for DemoScheduler {
    async fn now(&self) -> Result<DateTime<Utc>, OpError> {
        Ok(Utc::now())
    }

    async fn run(&self, token: CancellationToken) -> Result<(), OpError> {
        token.cancelled().await;
        Ok(())
    }
}

#[derive(Default)]
struct DemoState {
    entities: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl StateStore for DemoState {
    async fn add_entity(&self, namespace: &str, entity_id: &str, value: &str) -> Result<(), OpError> {
        tracing::info!(namespace, entity_id, value, "entity added");
        self.entities
            .lock()
            .await
            .insert(format!("{namespace}/{entity_id}"), value.to_string());
        Ok(())
    }

    async fn set_state(
        &self,
        _caller: &str,
        namespace: &str,
        entity_id: &str,
        value: &str,
    ) -> Result<(), OpError> {
        tracing::debug!(entity_id, value, "state updated");
        self.entities
            .lock()
            .await
            .insert(format!("{namespace}/{entity_id}"), value.to_string());
        Ok(())
    }

    async fn save_hybrid_namespaces(&self) -> Result<(), OpError> {
        Ok(())
    }
}

struct DemoEvents;

#[async_trait]
impl EventSink for DemoEvents {
    async fn process_event(&self, namespace: &str, event: RuntimeEvent) -> Result<(), OpError> {
        tracing::info!(namespace, event_type = %event.event_type, "runtime event");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = RuntimeConfig::from_env()?;
    tracing::info!(?cfg, "loaded configuration");

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(ConsoleSubscriber)];
    let sup = Supervisor::builder(cfg)
        .with_threads(Arc::new(DemoThreads::default()))
        .with_plugins(Arc::new(DemoPlugins::default()))
        .with_apps(Arc::new(DemoApps))
        .with_scheduler(Arc::new(DemoScheduler))
        .with_state(Arc::new(DemoState::default()))
        .with_events(Arc::new(DemoEvents))
        .with_subscribers(subs)
        .build()?;

    sup.stop_handle().stop_on_signal();
    sup.run().await?;
    Ok(())
}
