//! # Periodic maintenance: the ordered steps of one tick.
//!
//! A [`MaintenanceSchedule`] is an explicit ordered list of [`MaintenanceStep`]s built
//! once after bootstrap from the config and never reordered. A [`MaintenanceRunner`]
//! drives one pass over it per tick.
//!
//! ## Order
//! ```text
//! 1. check_app_updates               (apps enabled and not production mode)
//! 2. update_plugin_state
//! 3. check_q_size                    (counters + starvation policy in → counters out)
//! 4. check_overdue_and_dead_threads
//! 5. save_hybrid_namespaces
//! 6. run_plugin_utility
//! 7. update_uptime                   (scheduler now − booted_at → state store)
//! ```
//!
//! ## Fault containment
//! - Each step is timed by [`timed`](crate::core::timing::timed) and returns `Result<(), OpError>`
//! - A panic inside a step is caught and becomes [`OpError::Panicked`]
//! - The whole pass is one failure boundary: the first failing step ends the tick,
//!   is logged with step name and error, and is returned as a [`TickFailure`]
//! - A panic's message comes through in the error; its location and stack are
//!   left to the process panic hook, which sees the panicking frame
//! - Counters only change when `check_q_size` succeeds; a tick aborted earlier
//!   hands the previous counters to the next tick

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;

use crate::core::config::RuntimeConfig;
use crate::core::readings::{
    self, ADMIN_NAMESPACE, SUPERVISOR_CALLER, UPTIME_ENTITY, format_uptime,
};
use crate::core::timing::timed;
use crate::error::OpError;
use crate::events::Bus;
use crate::policies::{StarvationPolicy, WarningCounters};
use crate::runtime::Runtime;

/// One named maintenance operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaintenanceStep {
    CheckAppUpdates,
    UpdatePluginState,
    CheckQueueSize,
    CheckOverdueThreads,
    SaveHybridNamespaces,
    RunPluginUtility,
    UpdateUptime,
}

impl MaintenanceStep {
    /// Stable operation name used in logs and events.
    pub fn name(&self) -> &'static str {
        match self {
            MaintenanceStep::CheckAppUpdates => "check_app_updates",
            MaintenanceStep::UpdatePluginState => "update_plugin_state",
            MaintenanceStep::CheckQueueSize => "check_q_size",
            MaintenanceStep::CheckOverdueThreads => "check_overdue_and_dead_threads",
            MaintenanceStep::SaveHybridNamespaces => "save_hybrid_namespaces",
            MaintenanceStep::RunPluginUtility => "run_plugin_utility",
            MaintenanceStep::UpdateUptime => "update_uptime",
        }
    }
}

/// Fixed, ordered list of steps run on every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaintenanceSchedule {
    steps: Vec<MaintenanceStep>,
}

impl MaintenanceSchedule {
    /// Builds the schedule for `cfg`. App reconciliation is included only when apps
    /// are enabled outside production mode.
    pub fn for_config(cfg: &RuntimeConfig) -> Self {
        let mut steps = Vec::with_capacity(7);
        if cfg.reconcile_apps_each_tick() {
            steps.push(MaintenanceStep::CheckAppUpdates);
        }
        steps.extend([
            MaintenanceStep::UpdatePluginState,
            MaintenanceStep::CheckQueueSize,
            MaintenanceStep::CheckOverdueThreads,
            MaintenanceStep::SaveHybridNamespaces,
            MaintenanceStep::RunPluginUtility,
            MaintenanceStep::UpdateUptime,
        ]);
        Self { steps }
    }

    pub fn steps(&self) -> &[MaintenanceStep] {
        &self.steps
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(MaintenanceStep::name).collect()
    }
}

/// The step that ended a tick early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickFailure {
    pub step: &'static str,
    pub error: OpError,
}

/// Runs the maintenance schedule against the collaborators.
pub struct MaintenanceRunner {
    schedule: MaintenanceSchedule,
    runtime: Runtime,
    bus: Bus,
    slow_op_threshold: Duration,
    starvation: StarvationPolicy,
}

impl MaintenanceRunner {
    pub fn new(
        schedule: MaintenanceSchedule,
        runtime: Runtime,
        bus: Bus,
        slow_op_threshold: Duration,
        starvation: StarvationPolicy,
    ) -> Self {
        Self {
            schedule,
            runtime,
            bus,
            slow_op_threshold,
            starvation,
        }
    }

    pub fn schedule(&self) -> &MaintenanceSchedule {
        &self.schedule
    }

    /// Runs one tick. Returns the counters for the next tick and the first failure, if any.
    pub async fn run_tick(
        &self,
        tick: u64,
        booted_at: DateTime<Utc>,
        counters: WarningCounters,
    ) -> (WarningCounters, Result<(), TickFailure>) {
        let mut counters = counters;

        for step in self.schedule.steps() {
            let op = step.name();
            let invocation = std::panic::AssertUnwindSafe(self.invoke(*step, booted_at, &mut counters))
                .catch_unwind();
            let res = match timed(op, self.slow_op_threshold, &self.bus, invocation).await {
                Ok(res) => res,
                Err(payload) => Err(OpError::from_panic(payload)),
            };

            if let Err(error) = res {
                tracing::warn!(
                    tick,
                    step = op,
                    label = error.as_label(),
                    error = %error,
                    "unexpected error during maintenance tick"
                );
                return (counters, Err(TickFailure { step: op, error }));
            }
        }
        (counters, Ok(()))
    }

    async fn invoke(
        &self,
        step: MaintenanceStep,
        booted_at: DateTime<Utc>,
        counters: &mut WarningCounters,
    ) -> Result<(), OpError> {
        let rt = &self.runtime;
        match step {
            MaintenanceStep::CheckAppUpdates => match &rt.apps {
                Some(apps) => apps.check_app_updates().await,
                None => Ok(()),
            },
            MaintenanceStep::UpdatePluginState => rt.plugins.update_plugin_state().await,
            MaintenanceStep::CheckQueueSize => {
                *counters = rt.threads.check_q_size(*counters, &self.starvation).await?;
                Ok(())
            }
            MaintenanceStep::CheckOverdueThreads => {
                rt.threads.check_overdue_and_dead_threads().await
            }
            MaintenanceStep::SaveHybridNamespaces => rt.state.save_hybrid_namespaces().await,
            MaintenanceStep::RunPluginUtility => rt.plugins.run_plugin_utility().await,
            MaintenanceStep::UpdateUptime => {
                let now = rt.scheduler.now().await?;
                let uptime = format_uptime(readings::uptime_between(booted_at, now));
                rt.state
                    .set_state(SUPERVISOR_CALLER, ADMIN_NAMESPACE, UPTIME_ENTITY, &uptime)
                    .await
            }
        }
    }
}
