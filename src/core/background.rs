//! # BackgroundActor: supervision of the scheduler's tick task.
//!
//! The scheduler's tick loop runs alongside the maintenance loop as an independent
//! tokio task. The two share nothing but the collaborator interfaces.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► attempt += 1
//!   ├─► scheduler.run(child_token)
//!   │       ├─ Ok  ──► restart.should_restart(false)?
//!   │       └─ Err ──► publish BackgroundFailed, restart.should_restart(true)?
//!   ├─► token cancelled → exit
//!   └─► publish BackoffScheduled, sleep(backoff.next(failures)) (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** (never two scheduler loops at once)
//! - Cancellation is checked at **safe points**: before each attempt and during backoff
//! - The failure streak resets after a clean exit

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::policies::{BackoffPolicy, RestartPolicy};
use crate::runtime::Scheduler;

const TASK_NAME: &str = "scheduler";

/// Supervises the scheduler's tick task with restart and backoff policies.
pub struct BackgroundActor {
    scheduler: Arc<dyn Scheduler>,
    restart: RestartPolicy,
    backoff: BackoffPolicy,
    bus: Bus,
}

impl BackgroundActor {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        restart: RestartPolicy,
        backoff: BackoffPolicy,
        bus: Bus,
    ) -> Self {
        Self {
            scheduler,
            restart,
            backoff,
            bus,
        }
    }

    /// Runs until the restart policy is exhausted or `token` is cancelled.
    pub async fn run(self, token: CancellationToken) {
        let mut attempt: u32 = 0;
        let mut failures: u32 = 0;

        loop {
            if token.is_cancelled() {
                break;
            }
            attempt += 1;
            tracing::debug!(attempt, "starting scheduler tick task");

            let failed = match self.scheduler.run(token.child_token()).await {
                Ok(()) => {
                    failures = 0;
                    false
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "scheduler tick task failed");
                    self.bus.publish(
                        Event::new(EventKind::BackgroundFailed)
                            .with_op(TASK_NAME)
                            .with_attempt(attempt)
                            .with_reason(e.to_string()),
                    );
                    true
                }
            };

            if token.is_cancelled() || !self.restart.should_restart(failed) {
                break;
            }

            let delay = if failed {
                let d = self.backoff.next(failures);
                failures = failures.saturating_add(1);
                d
            } else {
                self.backoff.first
            };
            self.bus.publish(
                Event::new(EventKind::BackoffScheduled)
                    .with_op(TASK_NAME)
                    .with_attempt(attempt)
                    .with_delay(delay),
            );

            select! {
                _ = time::sleep(delay) => {}
                _ = token.cancelled() => break,
            }
        }
        tracing::debug!(attempt, "scheduler tick task exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpError;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails the first `fail_first` runs, then blocks until cancelled.
    struct Flaky {
        runs: AtomicU32,
        fail_first: u32,
    }

    #[async_trait]
    impl Scheduler for Flaky {
        async fn now(&self) -> Result<DateTime<Utc>, OpError> {
            Ok(DateTime::<Utc>::UNIX_EPOCH)
        }
        async fn run(&self, token: CancellationToken) -> Result<(), OpError> {
            let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.fail_first {
                return Err(OpError::fail(format!("tick loop crash #{n}")));
            }
            token.cancelled().await;
            Ok(())
        }
    }

    fn backoff() -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(1),
            factor: 2.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn restarts_failed_scheduler_with_growing_backoff() {
        let sched = Arc::new(Flaky {
            runs: AtomicU32::new(0),
            fail_first: 2,
        });
        let bus = Bus::new(32);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();

        let actor = BackgroundActor::new(sched.clone(), RestartPolicy::OnFailure, backoff(), bus);
        let join = tokio::spawn(actor.run(token.clone()));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sched.runs.load(Ordering::SeqCst), 3);
        token.cancel();
        join.await.unwrap();

        let mut delays = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::BackoffScheduled {
                delays.push(ev.delay_ms.unwrap());
            }
        }
        assert_eq!(delays, vec![100, 200]);
    }

    #[tokio::test(start_paused = true)]
    async fn never_policy_runs_once() {
        let sched = Arc::new(Flaky {
            runs: AtomicU32::new(0),
            fail_first: 5,
        });
        let actor = BackgroundActor::new(sched.clone(), RestartPolicy::Never, backoff(), Bus::new(8));
        actor.run(CancellationToken::new()).await;
        assert_eq!(sched.runs.load(Ordering::SeqCst), 1);
    }
}
