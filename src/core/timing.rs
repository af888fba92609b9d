//! # Timing wrapper for maintenance operations.
//!
//! [`timed`] measures one operation and reports it when it exceeds the
//! slow-operation threshold, so an operator can tell which step is degrading.
//!
//! ## Rules
//! - **Transparent**: the operation's output (including its error) is returned unchanged
//! - **Diagnostic only**: a slow operation is logged at `info` and published as
//!   `SlowOperation`; it is never cancelled or retried
//! - Measured with [`tokio::time::Instant`], so paused-clock tests see virtual time

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::events::{Bus, Event, EventKind};

/// Awaits `fut`, reporting it as `op` if it took longer than `threshold`.
pub async fn timed<F, T>(op: &'static str, threshold: Duration, bus: &Bus, fut: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let out = fut.await;
    let elapsed = started.elapsed();

    if elapsed > threshold {
        tracing::info!(
            op,
            elapsed_ms = elapsed.as_millis() as u64,
            "{op}() took {elapsed:?}"
        );
        bus.publish(
            Event::new(EventKind::SlowOperation)
                .with_op(op)
                .with_elapsed(elapsed)
                .with_budget(threshold),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpError;

    #[tokio::test(start_paused = true)]
    async fn slow_operation_is_reported_and_result_passed_through() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let slow = async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            Err::<(), _>(OpError::fail("plugin gone"))
        };
        let res = timed("update_plugin_state", Duration::from_secs(1), &bus, slow).await;

        assert_eq!(res, Err(OpError::fail("plugin gone")));
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::SlowOperation);
        assert_eq!(ev.op.as_deref(), Some("update_plugin_state"));
        assert_eq!(ev.elapsed_ms, Some(1500));
        assert_eq!(ev.budget_ms, Some(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_operation_is_silent() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let v = timed("check_q_size", Duration::from_secs(1), &bus, async {
            tokio::time::sleep(Duration::from_millis(999)).await;
            7
        })
        .await;

        assert_eq!(v, 7);
        assert!(rx.try_recv().is_err());
    }
}
