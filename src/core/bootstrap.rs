//! # Bootstrap sequencer.
//!
//! One-time initialization run after the readiness gate reports `Ready`.
//! Steps run strictly in order; each must complete before the next begins.
//!
//! ```text
//! 1. threads.init_admin_stats()
//! 2. threads.create_initial_threads()
//! 3. spawn BackgroundActor(scheduler)          (independent task)
//! 4. apps enabled?
//!      ├─ timed apps.check_app_updates()
//!      ├─ log "App initialization complete"
//!      └─ events.process_event("global", runtime_started)
//! 5. booted_at = scheduler.now()
//!    seed admin readings: version, uptime "0:00:00", boot time
//! ```
//!
//! Any step failure is fatal and returned as [`RuntimeError::Bootstrap`] naming the step.
//! If the failure happens after step 3, the background task is stopped and joined first.

use chrono::{DateTime, Utc};

use crate::core::background::BackgroundActor;
use crate::core::config::RuntimeConfig;
use crate::core::readings::{
    ADMIN_NAMESPACE, BOOTED_ENTITY, GLOBAL_NAMESPACE, UPTIME_ENTITY, VERSION, VERSION_ENTITY,
    format_boot_time,
};
use crate::core::shutdown::BackgroundHandle;
use crate::core::state::StopHandle;
use crate::core::timing::timed;
use crate::error::{OpError, RuntimeError};
use crate::events::Bus;
use crate::runtime::{Runtime, RuntimeEvent};

/// Outcome of a successful bootstrap.
pub(crate) struct Booted {
    pub at: DateTime<Utc>,
    pub background: BackgroundHandle,
}

fn step_failed(step: &'static str) -> impl FnOnce(OpError) -> RuntimeError {
    move |source| RuntimeError::Bootstrap { step, source }
}

pub(crate) async fn run(
    cfg: &RuntimeConfig,
    runtime: &Runtime,
    stop: &StopHandle,
    bus: &Bus,
) -> Result<Booted, RuntimeError> {
    runtime
        .threads
        .init_admin_stats()
        .await
        .map_err(step_failed("init_admin_stats"))?;
    runtime
        .threads
        .create_initial_threads()
        .await
        .map_err(step_failed("create_initial_threads"))?;

    let background = spawn_background(cfg, runtime, stop, bus);

    match finish(cfg, runtime, bus).await {
        Ok(at) => Ok(Booted { at, background }),
        Err(e) => {
            background.token.cancel();
            if let Err(join_err) = background.join.await {
                tracing::warn!(error = %join_err, "scheduler task did not exit cleanly");
            }
            Err(e)
        }
    }
}

fn spawn_background(
    cfg: &RuntimeConfig,
    runtime: &Runtime,
    stop: &StopHandle,
    bus: &Bus,
) -> BackgroundHandle {
    let actor = BackgroundActor::new(
        runtime.scheduler.clone(),
        cfg.scheduler_restart,
        cfg.scheduler_backoff,
        bus.clone(),
    );
    let token = stop.child_token();
    let join = tokio::spawn(actor.run(token.clone()));
    BackgroundHandle { token, join }
}

async fn finish(
    cfg: &RuntimeConfig,
    runtime: &Runtime,
    bus: &Bus,
) -> Result<DateTime<Utc>, RuntimeError> {
    if cfg.apps_enabled {
        if let Some(apps) = &runtime.apps {
            timed("check_app_updates", cfg.slow_op_threshold, bus, apps.check_app_updates())
                .await
                .map_err(step_failed("check_app_updates"))?;
        }
        tracing::info!("App initialization complete");
        runtime
            .events
            .process_event(GLOBAL_NAMESPACE, RuntimeEvent::started())
            .await
            .map_err(step_failed("process_event"))?;
    }

    let booted_at = runtime
        .scheduler
        .now()
        .await
        .map_err(step_failed("scheduler_now"))?;

    let seed = [
        (VERSION_ENTITY, VERSION.to_string()),
        (UPTIME_ENTITY, "0:00:00".to_string()),
        (BOOTED_ENTITY, format_boot_time(booted_at, cfg.time_zone)),
    ];
    for (entity, value) in seed {
        runtime
            .state
            .add_entity(ADMIN_NAMESPACE, entity, &value)
            .await
            .map_err(step_failed("seed_admin_readings"))?;
    }

    tracing::debug!(booted_at = %booted_at, "bootstrap complete");
    Ok(booted_at)
}
