//! # Supervisor: readiness, bootstrap, the maintenance loop and shutdown.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the stop flag and the
//! collaborator handles. [`Supervisor::run`] drives the whole lifecycle once.
//!
//! ## High-level flow
//! ```text
//! run()
//!   ├─► subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(event)
//!   ├─► gate::await_ready()
//!   │      └─ not Ready ─► request_stop() (host hook or StopHandle::stop) ─► return Ok
//!   ├─► bootstrap::run()  ─── step error ─► Err(RuntimeError::Bootstrap)
//!   │      └─ spawns BackgroundActor(scheduler) on a child token
//!   ├─► publish Booted
//!   ├─► while !stopping {
//!   │      ├─ tick += 1
//!   │      ├─ MaintenanceRunner::run_tick(tick, booted_at, counters)
//!   │      ├─ publish TickCompleted / TickFailed
//!   │      ├─ check_drift() ─► warn + SkewExceeded (+ profile stats)
//!   │      └─ sleep(tick_delay) or wake on stop
//!   │   }
//!   ├─► shutdown::drain(): apps.terminate, cancel + join scheduler task
//!   └─► SubscriberListener::finish(): flush pending events, join subscriber workers
//! ```
//!
//! ## Rules
//! - `run` may be called once; a second call returns [`RuntimeError::AlreadyRunning`]
//! - A tick in progress always runs to its end; stop is observed between ticks
//! - Drain runs exactly once, and only if bootstrap completed
//! - Subscribers have received every event, `ShutdownCompleted` included, by the time `run` returns

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::{
    bootstrap,
    builder::SupervisorBuilder,
    config::RuntimeConfig,
    drift::{SkewViolation, TickReport, check_drift},
    gate::{self, ReadyOutcome},
    maintenance::{MaintenanceRunner, MaintenanceSchedule},
    shutdown,
    state::{StopHandle, StopHook, SupervisorState},
};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::runtime::Runtime;
use crate::subscribers::SubscriberSet;

/// Drives the runtime's startup, periodic maintenance and shutdown.
pub struct Supervisor {
    cfg: RuntimeConfig,
    runtime: Runtime,
    bus: Bus,
    subs: Mutex<Option<SubscriberSet>>,
    stop: StopHandle,
    stop_hook: Option<StopHook>,
    started: AtomicBool,
}

impl Supervisor {
    /// Returns a builder for a supervisor with the given config.
    pub fn builder(cfg: RuntimeConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: RuntimeConfig,
        runtime: Runtime,
        bus: Bus,
        subs: SubscriberSet,
        stop_hook: Option<StopHook>,
    ) -> Self {
        Self {
            cfg,
            runtime,
            bus,
            subs: Mutex::new(Some(subs)),
            stop: StopHandle::new(),
            stop_hook,
            started: AtomicBool::new(false),
        }
    }

    /// Handle to the stop flag. Calling [`StopHandle::stop`] ends the loop after the current tick.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.cfg
    }

    /// Receiver observing every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs the supervisor until stopped.
    ///
    /// Returns `Ok(())` after a controlled stop (including a readiness gate failure)
    /// and `Err` only for bootstrap failures or a repeated call.
    pub async fn run(&self) -> Result<(), RuntimeError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(RuntimeError::AlreadyRunning);
        }
        let listener = self.subscriber_listener();
        let res = self.lifecycle().await;
        if let Some(listener) = listener {
            listener.finish().await;
        }
        res
    }

    async fn lifecycle(&self) -> Result<(), RuntimeError> {
        let outcome = gate::await_ready(self.runtime.plugins.as_ref(), &self.stop, &self.bus).await;
        if outcome != ReadyOutcome::Ready {
            self.request_stop(outcome.as_label());
            return Ok(());
        }

        let booted = bootstrap::run(&self.cfg, &self.runtime, &self.stop, &self.bus).await?;
        self.bus.publish(Event::new(EventKind::Booted));
        tracing::info!(booted_at = %booted.at, "runtime booted");

        let state = SupervisorState::new(booted.at);
        let state = self.maintenance_loop(state).await;
        tracing::debug!(ticks = state.ticks, "maintenance loop exited");

        shutdown::drain(&self.runtime, booted.background, &self.bus).await;
        Ok(())
    }

    async fn maintenance_loop(&self, mut state: SupervisorState) -> SupervisorState {
        let runner = MaintenanceRunner::new(
            MaintenanceSchedule::for_config(&self.cfg),
            self.runtime.clone(),
            self.bus.clone(),
            self.cfg.slow_op_threshold,
            self.cfg.starvation,
        );
        tracing::debug!(steps = ?runner.schedule().names(), "maintenance schedule");

        while !self.stop.is_stopping() {
            state.ticks += 1;
            let started = Instant::now();
            let (counters, res) = runner
                .run_tick(state.ticks, state.booted_at(), state.counters)
                .await;
            state.counters = counters;

            let report = TickReport::new(state.ticks, started, Instant::now(), res.err());
            self.report_tick(&report);
            if let Some(violation) = check_drift(&report, &self.cfg) {
                self.report_skew(violation);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.cfg.tick_delay) => {}
                _ = self.stop.stopped() => {}
            }
        }
        state
    }

    fn report_tick(&self, report: &TickReport) {
        let ev = match &report.failure {
            None => {
                tracing::debug!(
                    tick = report.tick,
                    elapsed_ms = report.duration_ms,
                    "maintenance tick complete"
                );
                Event::new(EventKind::TickCompleted)
            }
            Some(failure) => Event::new(EventKind::TickFailed)
                .with_op(failure.step)
                .with_reason(failure.error.to_string()),
        };
        self.bus
            .publish(ev.with_tick(report.tick).with_elapsed(report.duration()));
    }

    fn report_skew(&self, v: SkewViolation) {
        tracing::warn!(
            tick = v.tick,
            elapsed_ms = v.actual.as_millis() as u64,
            budget_ms = v.budget.as_millis() as u64,
            "Excessive time spent in maintenance loop: {}ms (over budget by {}ms)",
            v.actual.as_millis(),
            v.overrun.as_millis()
        );
        self.bus.publish(
            Event::new(EventKind::SkewExceeded)
                .with_tick(v.tick)
                .with_elapsed(v.actual)
                .with_budget(v.budget),
        );

        if self.cfg.profile_on_skew {
            if let Some(stats) = self.runtime.apps.as_ref().and_then(|a| a.profile_stats()) {
                tracing::info!("Profile information for maintenance loop\n{stats}");
            }
        }
    }

    /// Stops through the host hook if one is installed, otherwise directly.
    fn request_stop(&self, reason: &'static str) {
        self.bus
            .publish(Event::new(EventKind::StopRequested).with_reason(reason));
        match &self.stop_hook {
            Some(hook) => hook(),
            None => self.stop.stop(),
        }
    }

    /// Moves the subscriber set into a task that forwards bus events to it.
    ///
    /// Returns `None` when no subscribers are registered.
    fn subscriber_listener(&self) -> Option<SubscriberListener> {
        let set = self
            .subs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        if set.is_empty() {
            return None;
        }

        let mut rx = self.bus.subscribe();
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(Arc::new(ev)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "subscriber listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = cancelled.cancelled() => break,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(Arc::new(ev)),
                    Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                    }
                    Err(_) => break,
                }
            }
            set.shutdown().await;
        });
        Some(SubscriberListener { token, join })
    }
}

/// Running bus-to-subscribers forwarder.
struct SubscriberListener {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl SubscriberListener {
    /// Forwards what is already on the bus, then waits for every subscriber worker to finish.
    async fn finish(self) {
        self.token.cancel();
        if let Err(e) = self.join.await {
            tracing::warn!(error = %e, "subscriber listener did not exit cleanly");
        }
    }
}
