use async_trait::async_trait;

use crate::error::OpError;

/// State store holding entity readings partitioned into namespaces.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Creates (or replaces) an entity with an initial value.
    async fn add_entity(
        &self,
        namespace: &str,
        entity_id: &str,
        value: &str,
    ) -> Result<(), OpError>;

    /// Updates an entity's value on behalf of `caller`.
    async fn set_state(
        &self,
        caller: &str,
        namespace: &str,
        entity_id: &str,
        value: &str,
    ) -> Result<(), OpError>;

    /// Persists every namespace marked for periodic durable save ("hybrid" namespaces).
    async fn save_hybrid_namespaces(&self) -> Result<(), OpError>;
}
