use async_trait::async_trait;

use crate::error::OpError;

/// Hot-reloadable application layer.
#[async_trait]
pub trait AppManager: Send + Sync + 'static {
    /// Re-reads app configuration and reloads/starts/stops the affected apps.
    async fn check_app_updates(&self) -> Result<(), OpError>;

    /// Drains and stops every app. Awaited without a timeout during shutdown.
    async fn terminate(&self) -> Result<(), OpError>;

    /// Accumulated profiling statistics for `check_app_updates`, if profiling is on.
    fn profile_stats(&self) -> Option<String> {
        None
    }
}
