//! # Collaborator contracts.
//!
//! The supervisor does not schedule callbacks, size thread pools, speak plugin
//! protocols, diff app configuration or store state. It only calls into the
//! subsystems that do, through the traits defined here:
//!
//! | Trait           | Role                                                  |
//! |-----------------|-------------------------------------------------------|
//! | [`ThreadPool`]  | worker accounting, queue health, overdue/dead workers |
//! | [`Plugins`]     | readiness, metadata, state refresh, housekeeping      |
//! | [`AppManager`]  | app reconciliation, drain, profiling stats            |
//! | [`Scheduler`]   | time source and independent tick task                 |
//! | [`StateStore`]  | status readings and hybrid namespace persistence      |
//! | [`EventSink`]   | fire-and-forget runtime events                        |
//!
//! Every call is a suspension point. Implementations own their synchronization:
//! the supervisor holds no locks and treats each call as atomic.

mod apps;
mod event_sink;
mod plugins;
mod scheduler;
mod state;
mod threads;

use std::sync::Arc;

pub use apps::AppManager;
pub use event_sink::{EventSink, RuntimeEvent};
pub use plugins::Plugins;
pub use scheduler::Scheduler;
pub use state::StateStore;
pub use threads::ThreadPool;

/// Handles to every collaborator the supervisor drives.
///
/// `apps` is `None` when the runtime is built without an application layer.
#[derive(Clone)]
pub struct Runtime {
    pub threads: Arc<dyn ThreadPool>,
    pub plugins: Arc<dyn Plugins>,
    pub apps: Option<Arc<dyn AppManager>>,
    pub scheduler: Arc<dyn Scheduler>,
    pub state: Arc<dyn StateStore>,
    pub events: Arc<dyn EventSink>,
}
