//! # tickvisor
//!
//! **Tickvisor** is the supervisory loop of a long-running automation runtime.
//!
//! It waits for the plugin layer to become ready, runs a one-time ordered bootstrap,
//! then drives a fixed set of maintenance operations on a periodic tick until asked to
//! stop, and finally drains the application layer. It does not schedule callbacks,
//! manage worker threads or persist state itself: those subsystems are collaborators
//! reached through the traits in [`runtime`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────┐ ┌─────────┐ ┌────────────┐ ┌───────────┐ ┌────────────┐ ┌───────────┐
//!  │ThreadPool│ │ Plugins │ │ AppManager │ │ Scheduler │ │ StateStore │ │ EventSink │
//!  └────┬─────┘ └────┬────┘ └─────┬──────┘ └─────┬─────┘ └─────┬──────┘ └─────┬─────┘
//!       └────────────┴────────────┴──────┬───────┴─────────────┴──────────────┘
//!                                        ▼
//! ┌──────────────────────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                                      │
//! │  - readiness gate           (plugins ready + metadata present)                   │
//! │  - bootstrap sequencer      (threads, scheduler task, apps, admin readings)      │
//! │  - maintenance runner       (ordered timed steps, one failure boundary per tick) │
//! │  - drift monitor            (tick duration vs max_skew, realtime only)           │
//! │  - shutdown                 (apps.terminate, join scheduler task)                │
//! │  - StopHandle               (monotonic stop flag)                                │
//! └───────┬───────────────────────────────────────────────────┬──────────────────────┘
//!         │ spawn (child token)                               │ publish(Event)
//!         ▼                                                   ▼
//!  ┌────────────────┐                              ┌─────────────────────┐
//!  │BackgroundActor │── BackgroundFailed ────────► │ Bus (broadcast)     │
//!  │ scheduler.run  │── BackoffScheduled ────────► └──────────┬──────────┘
//!  └────────────────┘                                         ▼
//!                                                  subscriber_listener
//!                                                             ▼
//!                                                  SubscriberSet (per-sub queues)
//! ```
//!
//! ### Lifecycle
//! ```text
//! run()
//!   ├─► await_ready ── not Ready ─► stop hook / stop ─► Ok(())
//!   ├─► bootstrap  ─── error ─────► Err(RuntimeError::Bootstrap)
//!   ├─► loop while !stopping {
//!   │     run_tick ─► TickCompleted | TickFailed
//!   │     check_drift ─► SkewExceeded
//!   │     sleep(tick_delay) (wakes on stop)
//!   │   }
//!   └─► drain ─► ShutdownCompleted ─► Ok(())
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Supervision**   | Readiness, bootstrap, periodic maintenance, drain.             | [`Supervisor`], [`SupervisorBuilder`]       |
//! | **Collaborators** | Interfaces the supervisor drives.                              | [`ThreadPool`], [`Plugins`], [`Scheduler`]… |
//! | **Policies**      | Scheduler task restarts and queue starvation window.           | [`RestartPolicy`], [`StarvationPolicy`]     |
//! | **Subscriber API**| React to supervisor events (metrics, alerting, tests).         | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for bootstrap, steps and configuration.           | [`RuntimeError`], [`OpError`]               |
//! | **Configuration** | Centralized runtime settings, from code or `TICKVISOR_*` env.  | [`RuntimeConfig`]                           |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tickvisor::{RuntimeConfig, Supervisor};
//! # use tickvisor::runtime::{AppManager, EventSink, Plugins, Scheduler, StateStore, ThreadPool};
//! # async fn collaborators() -> (Arc<dyn ThreadPool>, Arc<dyn Plugins>, Arc<dyn AppManager>,
//! #     Arc<dyn Scheduler>, Arc<dyn StateStore>, Arc<dyn EventSink>) { unimplemented!() }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = RuntimeConfig::from_env()?;
//!     let (threads, plugins, apps, scheduler, state, events) = collaborators().await;
//!
//!     let sup = Supervisor::builder(cfg)
//!         .with_threads(threads)
//!         .with_plugins(plugins)
//!         .with_apps(apps)
//!         .with_scheduler(scheduler)
//!         .with_state(state)
//!         .with_events(events)
//!         .build()?;
//!
//!     // SIGINT/SIGTERM/SIGQUIT end the loop after the current tick.
//!     sup.stop_handle().stop_on_signal();
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
pub mod events;
pub mod policies;
pub mod runtime;
pub mod subscribers;

// ---- Public re-exports ----

pub use core::{
    ADMIN_NAMESPACE, BOOTED_ENTITY, GLOBAL_NAMESPACE, MaintenanceSchedule, MaintenanceStep,
    ReadyOutcome, RuntimeConfig, SUPERVISOR_CALLER, SkewViolation, StopHandle, StopHook,
    Supervisor, SupervisorBuilder, TickFailure, TickReport, UPTIME_ENTITY, VERSION,
    VERSION_ENTITY, check_drift, format_boot_time, format_uptime, timed, uptime_between,
    wait_for_shutdown_signal,
};
pub use error::{ConfigError, OpError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use policies::{
    BackoffPolicy, RestartPolicy, StarvationAssessment, StarvationPolicy, WarningCounters,
};
pub use runtime::{AppManager, EventSink, Plugins, RuntimeEvent, Scheduler, StateStore, ThreadPool};
pub use subscribers::{Subscribe, SubscriberSet};
