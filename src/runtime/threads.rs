use async_trait::async_trait;

use crate::error::OpError;
use crate::policies::{StarvationPolicy, WarningCounters};

/// Worker-thread pool.
///
/// Sizing and dispatch are the pool's business; the supervisor only sets it up
/// once and polls its health every tick.
#[async_trait]
pub trait ThreadPool: Send + Sync + 'static {
    /// Creates the administrative counters. Called once during bootstrap.
    async fn init_admin_stats(&self) -> Result<(), OpError>;

    /// Starts the initial fixed set of workers. Called once during bootstrap.
    async fn create_initial_threads(&self) -> Result<(), OpError>;

    /// Rolling starvation check over worker queue depths.
    ///
    /// Receives the counters returned by the previous successful call and the
    /// configured `policy`, and returns the counters for the next call.
    /// Implementations are expected to fold their total queue depth through
    /// [`StarvationPolicy::assess`] and log per-worker details when it asks for a warning.
    async fn check_q_size(
        &self,
        counters: WarningCounters,
        policy: &StarvationPolicy,
    ) -> Result<WarningCounters, OpError>;

    /// Reports workers that are overdue or dead, restarting dead ones per pool policy.
    async fn check_overdue_and_dead_threads(&self) -> Result<(), OpError>;
}
