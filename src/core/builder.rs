use std::sync::Arc;

use crate::{
    core::{config::RuntimeConfig, state::StopHook},
    error::RuntimeError,
    events::Bus,
    runtime::{AppManager, EventSink, Plugins, Runtime, Scheduler, StateStore, ThreadPool},
    subscribers::{Subscribe, SubscriberSet},
};
use super::supervisor::Supervisor;

/// Builder for constructing a [`Supervisor`] from its collaborators.
pub struct SupervisorBuilder {
    cfg: RuntimeConfig,
    threads: Option<Arc<dyn ThreadPool>>,
    plugins: Option<Arc<dyn Plugins>>,
    apps: Option<Arc<dyn AppManager>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    state: Option<Arc<dyn StateStore>>,
    events: Option<Arc<dyn EventSink>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    stop_hook: Option<StopHook>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: RuntimeConfig) -> Self {
        Self {
            cfg,
            threads: None,
            plugins: None,
            apps: None,
            scheduler: None,
            state: None,
            events: None,
            subscribers: Vec::new(),
            stop_hook: None,
        }
    }

    pub fn with_threads(mut self, threads: Arc<dyn ThreadPool>) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_plugins(mut self, plugins: Arc<dyn Plugins>) -> Self {
        self.plugins = Some(plugins);
        self
    }

    /// Sets the application layer. Required when `apps_enabled` is on, ignored otherwise.
    pub fn with_apps(mut self, apps: Arc<dyn AppManager>) -> Self {
        self.apps = Some(apps);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_state(mut self, state: Arc<dyn StateStore>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive supervisor events (readiness, ticks, skew, shutdown)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Installs the host's stop function, called instead of stopping directly when
    /// the readiness gate fails.
    pub fn with_stop_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.stop_hook = Some(Arc::new(hook));
        self
    }

    /// Builds the supervisor.
    ///
    /// Fails with [`RuntimeError::MissingCollaborator`] if a required collaborator
    /// was not provided. Must be called from within a tokio runtime (subscriber
    /// workers are spawned here).
    pub fn build(self) -> Result<Arc<Supervisor>, RuntimeError> {
        let apps = if self.cfg.apps_enabled {
            Some(self.apps.ok_or(RuntimeError::MissingCollaborator("apps"))?)
        } else {
            None
        };
        let runtime = Runtime {
            threads: self.threads.ok_or(RuntimeError::MissingCollaborator("threads"))?,
            plugins: self.plugins.ok_or(RuntimeError::MissingCollaborator("plugins"))?,
            apps,
            scheduler: self
                .scheduler
                .ok_or(RuntimeError::MissingCollaborator("scheduler"))?,
            state: self.state.ok_or(RuntimeError::MissingCollaborator("state"))?,
            events: self.events.ok_or(RuntimeError::MissingCollaborator("events"))?,
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());

        Ok(Arc::new(Supervisor::new_internal(
            self.cfg,
            runtime,
            bus,
            subs,
            self.stop_hook,
        )))
    }
}
