//! # Lifecycle events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Startup events**: readiness gate outcome, bootstrap completion
//! - **Tick events**: per-tick completion/failure, slow operations, skew
//! - **Background events**: scheduler task failures and restart backoff
//! - **Shutdown / subscriber events**: drain progress, subscriber overflow and panics
//!
//! The [`Event`] struct carries additional metadata such as timestamps, operation
//! name, reasons, elapsed time and budgets.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SlowOperation)
//!     .with_op("update_plugin_state")
//!     .with_elapsed(Duration::from_millis(1500))
//!     .with_budget(Duration::from_secs(1));
//!
//! assert_eq!(ev.kind, EventKind::SlowOperation);
//! assert_eq!(ev.op.as_deref(), Some("update_plugin_state"));
//! assert_eq!(ev.elapsed_ms, Some(1500));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Startup ===
    /// All plugins reported ready and required metadata is present.
    RuntimeReady,

    /// Readiness gate did not open.
    ///
    /// Sets:
    /// - `reason`: `metadata_missing`, `plugins_unavailable` or `interrupted`
    ReadinessFailed,

    /// The readiness gate failed and the supervisor requested a stop.
    ///
    /// Sets:
    /// - `reason`: the gate outcome label
    StopRequested,

    /// Bootstrap finished; the maintenance loop is about to start.
    Booted,

    // === Tick ===
    /// A timed operation exceeded the slow-operation threshold.
    ///
    /// Sets:
    /// - `op`: operation name
    /// - `elapsed_ms`: measured duration
    /// - `budget_ms`: configured threshold
    SlowOperation,

    /// A tick ran all of its steps.
    ///
    /// Sets:
    /// - `tick`: tick number (1-based)
    /// - `elapsed_ms`: tick duration
    TickCompleted,

    /// A step failed and the rest of the tick was skipped.
    ///
    /// Sets:
    /// - `tick`: tick number
    /// - `op`: failing step
    /// - `reason`: error message
    /// - `elapsed_ms`: tick duration up to the failure
    TickFailed,

    /// A tick overran the configured skew budget (realtime mode only).
    ///
    /// Sets:
    /// - `tick`: tick number
    /// - `elapsed_ms`: tick duration
    /// - `budget_ms`: configured `max_skew`
    SkewExceeded,

    // === Background scheduler task ===
    /// The scheduler tick task exited with an error.
    ///
    /// Sets:
    /// - `op`: task name
    /// - `attempt`: attempt number
    /// - `reason`: error message
    BackgroundFailed,

    /// The scheduler tick task will be restarted after a delay.
    ///
    /// Sets:
    /// - `op`: task name
    /// - `attempt`: previous attempt number
    /// - `delay_ms`: delay before the next attempt
    BackoffScheduled,

    // === Shutdown ===
    /// The loop observed `stopping` and the shutdown sequence began.
    ShutdownStarted,

    /// Apps were drained and the background task joined.
    ShutdownCompleted,

    // === Subscribers ===
    /// Subscriber panicked during event processing.
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    SubscriberOverflow,
}

/// Supervisor event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Operation or task name, if applicable.
    pub op: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Measured duration in milliseconds.
    pub elapsed_ms: Option<u64>,
    /// Configured budget/threshold in milliseconds.
    pub budget_ms: Option<u64>,
    /// Tick number.
    pub tick: Option<u64>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff delay before next attempt in milliseconds.
    pub delay_ms: Option<u64>,
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            op: None,
            reason: None,
            elapsed_ms: None,
            budget_ms: None,
            tick: None,
            attempt: None,
            delay_ms: None,
        }
    }

    /// Attaches an operation name.
    #[inline]
    pub fn with_op(mut self, op: impl Into<Arc<str>>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a measured duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(millis(d));
        self
    }

    /// Attaches a budget or threshold (stored as milliseconds).
    #[inline]
    pub fn with_budget(mut self, d: Duration) -> Self {
        self.budget_ms = Some(millis(d));
        self
    }

    /// Attaches a tick number.
    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(millis(d));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_op(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_op(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TickCompleted);
        let b = Event::new(EventKind::TickCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn overflow_event_names_subscriber() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.op.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
