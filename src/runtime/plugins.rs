use async_trait::async_trait;

use crate::error::OpError;

/// Plugin layer: the runtime's source of truth for external device/service state.
#[async_trait]
pub trait Plugins: Send + Sync + 'static {
    /// Suspends until every plugin has initialized.
    ///
    /// Returns `false` if the plugin layer gave up (e.g. it was torn down while waiting).
    async fn wait_for_plugins(&self) -> bool;

    /// Returns `true` if the metadata required to start (time zone, location, ...) is present.
    async fn required_meta_check(&self) -> bool;

    /// Asks every connected plugin for a fresh state snapshot.
    async fn update_plugin_state(&self) -> Result<(), OpError>;

    /// Runs each plugin's lightweight periodic housekeeping hook.
    async fn run_plugin_utility(&self) -> Result<(), OpError>;
}
