//! # Drift monitor.
//!
//! After each tick the supervisor compares the tick's duration to the configured
//! skew budget. Detection is strictly after the fact: a slow tick is reported,
//! never interrupted, and the loop carries on.
//!
//! A violation is reported iff `realtime_mode` is on **and** the tick's duration,
//! truncated to whole milliseconds, is strictly greater than `max_skew`.

use std::time::Duration;

use tokio::time::Instant;

use crate::core::config::RuntimeConfig;
use crate::core::maintenance::TickFailure;

/// Timing of one tick. Produced and discarded each iteration.
#[derive(Clone, Debug)]
pub struct TickReport {
    /// Tick number (1-based).
    pub tick: u64,
    pub started: Instant,
    pub finished: Instant,
    /// `finished - started`, truncated to whole milliseconds.
    pub duration_ms: u64,
    /// Step that aborted the tick, if any.
    pub failure: Option<TickFailure>,
}

impl TickReport {
    pub fn new(
        tick: u64,
        started: Instant,
        finished: Instant,
        failure: Option<TickFailure>,
    ) -> Self {
        let duration_ms = finished.saturating_duration_since(started).as_millis() as u64;
        Self {
            tick,
            started,
            finished,
            duration_ms,
            failure,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// A tick that overran the skew budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkewViolation {
    pub tick: u64,
    pub budget: Duration,
    pub actual: Duration,
    /// `actual - budget`.
    pub overrun: Duration,
}

/// Checks one tick against the skew budget. Pure observation.
pub fn check_drift(report: &TickReport, cfg: &RuntimeConfig) -> Option<SkewViolation> {
    if !cfg.realtime_mode {
        return None;
    }
    let budget_ms = cfg.max_skew.as_millis() as u64;
    if report.duration_ms <= budget_ms {
        return None;
    }
    let actual = report.duration();
    Some(SkewViolation {
        tick: report.tick,
        budget: cfg.max_skew,
        actual,
        overrun: actual.saturating_sub(cfg.max_skew),
    })
}
