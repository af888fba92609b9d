use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::OpError;

/// A runtime-level event delivered to the host's event bus.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeEvent {
    pub event_type: String,
    pub data: Value,
}

impl RuntimeEvent {
    /// Event type published once bootstrap has loaded the apps.
    pub const STARTED: &'static str = "runtime_started";

    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// The "runtime started" event with an empty payload.
    pub fn started() -> Self {
        Self::new(Self::STARTED, Value::Object(Map::new()))
    }
}

/// Host event bus. Fire-and-forget from the supervisor's point of view.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    async fn process_event(&self, namespace: &str, event: RuntimeEvent) -> Result<(), OpError>;
}
