use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::OpError;

/// Callback scheduler.
///
/// Provides the scheduler-relative clock (which may run faster or slower than the
/// wall clock outside realtime mode) and its own tick-processing loop, which the
/// supervisor launches as an independent task during bootstrap.
#[async_trait]
pub trait Scheduler: Send + Sync + 'static {
    /// Current scheduler time.
    async fn now(&self) -> Result<DateTime<Utc>, OpError>;

    /// Runs the tick-processing loop until `token` is cancelled.
    ///
    /// Returning `Err` before cancellation is a failure the background actor may
    /// restart per [`RestartPolicy`](crate::RestartPolicy).
    async fn run(&self, token: CancellationToken) -> Result<(), OpError>;
}
