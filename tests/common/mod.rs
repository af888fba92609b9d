//! In-memory collaborators that record every call made by the supervisor.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use tickvisor::{
    AppManager, EventKind, EventSink, OpError, Plugins, RuntimeConfig, RuntimeEvent, Scheduler,
    StarvationPolicy, StateStore, StopHandle, Supervisor, SupervisorBuilder, ThreadPool,
    WarningCounters,
};

/// What a call should do on its n-th invocation (1-based).
#[derive(Clone)]
pub enum Action {
    Fail,
    Panic,
    Sleep(Duration),
}

pub struct Mock {
    pub plugins_ready: bool,
    pub meta_present: bool,
    /// Scheduler clock at supervisor creation.
    pub base: DateTime<Utc>,
    /// Queue depth reported to the starvation policy.
    pub queue_depth: usize,

    pub(crate) started: Instant,
    pub(crate) calls: Mutex<Vec<&'static str>>,
    pub(crate) counts: Mutex<HashMap<&'static str, u32>>,
    pub(crate) plan: Mutex<HashMap<(&'static str, u32), Action>>,
    pub(crate) stop_after: Mutex<Option<(&'static str, u32)>>,
    pub(crate) stop: Mutex<Option<StopHandle>>,

    pub q_inputs: Mutex<Vec<WarningCounters>>,
    /// Calls of `check_q_size` (1-based) where the policy asked for a warning.
    pub q_warnings: Mutex<Vec<u32>>,
    pub entities: Mutex<HashMap<String, String>>,
    pub uptimes: Mutex<Vec<String>>,
    pub runtime_events: Mutex<Vec<(String, RuntimeEvent)>>,
    /// Scheduler tick task runs (started, exited).
    pub scheduler_runs: Mutex<(u32, u32)>,
}

impl Mock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::unshared())
    }

    pub fn unshared() -> Self {
        Self {
            plugins_ready: true,
            meta_present: true,
            base: Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap(),
            queue_depth: 100,
            started: Instant::now(),
            calls: Mutex::new(Vec::new()),
            counts: Mutex::new(HashMap::new()),
            plan: Mutex::new(HashMap::new()),
            stop_after: Mutex::new(None),
            stop: Mutex::new(None),
            q_inputs: Mutex::new(Vec::new()),
            q_warnings: Mutex::new(Vec::new()),
            entities: Mutex::new(HashMap::new()),
            uptimes: Mutex::new(Vec::new()),
            runtime_events: Mutex::new(Vec::new()),
            scheduler_runs: Mutex::new((0, 0)),
        }
    }

    /// Makes the `nth` call of `op` behave as `action`.
    pub fn on(&self, op: &'static str, nth: u32, action: Action) {
        self.plan.lock().unwrap().insert((op, nth), action);
    }

    /// Requests a stop from inside the `nth` call of `op`.
    pub fn stop_after(&self, op: &'static str, nth: u32) {
        *self.stop_after.lock().unwrap() = Some((op, nth));
    }

    pub fn attach(&self, stop: StopHandle) {
        *self.stop.lock().unwrap() = Some(stop);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &'static str) -> u32 {
        self.counts.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    async fn call(&self, op: &'static str) -> Result<(), OpError> {
        self.calls.lock().unwrap().push(op);
        let n = {
            let mut counts = self.counts.lock().unwrap();
            let n = counts.entry(op).or_insert(0);
            *n += 1;
            *n
        };

        if *self.stop_after.lock().unwrap() == Some((op, n)) {
            if let Some(stop) = self.stop.lock().unwrap().as_ref() {
                stop.stop();
            }
        }

        let action = self.plan.lock().unwrap().get(&(op, n)).cloned();
        match action {
            None => Ok(()),
            Some(Action::Fail) => Err(OpError::fail(format!("{op} failed on call {n}"))),
            Some(Action::Panic) => panic!("{op} exploded"),
            Some(Action::Sleep(d)) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ThreadPool for Mock {
    async fn init_admin_stats(&self) -> Result<(), OpError> {
        self.call("init_admin_stats").await
    }

    async fn create_initial_threads(&self) -> Result<(), OpError> {
        self.call("create_initial_threads").await
    }

    async fn check_q_size(
        &self,
        counters: WarningCounters,
        policy: &StarvationPolicy,
    ) -> Result<WarningCounters, OpError> {
        self.call("check_q_size").await?;
        self.q_inputs.lock().unwrap().push(counters);
        let assessment = policy.assess(counters, self.queue_depth);
        if assessment.warn {
            let n = self.count("check_q_size");
            self.q_warnings.lock().unwrap().push(n);
        }
        Ok(assessment.counters)
    }

    async fn check_overdue_and_dead_threads(&self) -> Result<(), OpError> {
        self.call("check_overdue_and_dead_threads").await
    }
}

#[async_trait]
impl Plugins for Mock {
    async fn wait_for_plugins(&self) -> bool {
        let _ = self.call("wait_for_plugins").await;
        self.plugins_ready
    }

    async fn required_meta_check(&self) -> bool {
        let _ = self.call("required_meta_check").await;
        self.meta_present
    }

    async fn update_plugin_state(&self) -> Result<(), OpError> {
        self.call("update_plugin_state").await
    }

    async fn run_plugin_utility(&self) -> Result<(), OpError> {
        self.call("run_plugin_utility").await
    }
}

#[async_trait]
impl AppManager for Mock {
    async fn check_app_updates(&self) -> Result<(), OpError> {
        self.call("check_app_updates").await
    }

    async fn terminate(&self) -> Result<(), OpError> {
        self.call("terminate").await
    }

    fn profile_stats(&self) -> Option<String> {
        Some("check_app_updates: 1 call".to_string())
    }
}

#[async_trait]
impl Scheduler for Mock {
    async fn now(&self) -> Result<DateTime<Utc>, OpError> {
        let elapsed = chrono::TimeDelta::from_std(self.started.elapsed())
            .map_err(|e| OpError::fail(e.to_string()))?;
        Ok(self.base + elapsed)
    }

    async fn run(&self, token: CancellationToken) -> Result<(), OpError> {
        self.scheduler_runs.lock().unwrap().0 += 1;
        token.cancelled().await;
        self.scheduler_runs.lock().unwrap().1 += 1;
        Ok(())
    }
}

#[async_trait]
impl StateStore for Mock {
    async fn add_entity(&self, namespace: &str, entity_id: &str, value: &str) -> Result<(), OpError> {
        self.call("add_entity").await?;
        self.entities
            .lock()
            .unwrap()
            .insert(format!("{namespace}/{entity_id}"), value.to_string());
        Ok(())
    }

    async fn set_state(
        &self,
        caller: &str,
        namespace: &str,
        entity_id: &str,
        value: &str,
    ) -> Result<(), OpError> {
        self.call("set_state").await?;
        assert_eq!(caller, tickvisor::SUPERVISOR_CALLER);
        assert_eq!(namespace, tickvisor::ADMIN_NAMESPACE);
        assert_eq!(entity_id, tickvisor::UPTIME_ENTITY);
        self.uptimes.lock().unwrap().push(value.to_string());
        Ok(())
    }

    async fn save_hybrid_namespaces(&self) -> Result<(), OpError> {
        self.call("save_hybrid_namespaces").await
    }
}

#[async_trait]
impl EventSink for Mock {
    async fn process_event(&self, namespace: &str, event: RuntimeEvent) -> Result<(), OpError> {
        self.call("process_event").await?;
        self.runtime_events
            .lock()
            .unwrap()
            .push((namespace.to_string(), event));
        Ok(())
    }
}

/// Builder with every collaborator (apps included) backed by `mock`.
pub fn builder(cfg: RuntimeConfig, mock: &Arc<Mock>) -> SupervisorBuilder {
    Supervisor::builder(cfg)
        .with_threads(mock.clone())
        .with_plugins(mock.clone())
        .with_apps(mock.clone())
        .with_scheduler(mock.clone())
        .with_state(mock.clone())
        .with_events(mock.clone())
}

/// Builds the supervisor and lets the mock request stops through it.
pub fn supervisor(cfg: RuntimeConfig, mock: &Arc<Mock>) -> Arc<Supervisor> {
    let sup = builder(cfg, mock).build().unwrap();
    mock.attach(sup.stop_handle());
    sup
}

/// Fast-ticking config: no pause between ticks, generous budgets.
pub fn quick_config() -> RuntimeConfig {
    RuntimeConfig {
        tick_delay: Duration::ZERO,
        max_skew: Duration::from_secs(60),
        slow_op_threshold: Duration::from_secs(60),
        ..RuntimeConfig::default()
    }
}

pub fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<tickvisor::Event>) -> Vec<tickvisor::Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

pub fn count_kind(events: &[tickvisor::Event], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}
