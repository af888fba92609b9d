//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! supervisor. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue owned by the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they do **not** block the
//!   maintenance loop nor other subscribers.
//! - Each subscriber declares its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. On overflow, events for that subscriber are dropped.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use tickvisor::{Event, EventKind, Subscribe};
//!
//! struct SkewAlert;
//!
//! #[async_trait]
//! impl Subscribe for SkewAlert {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::SkewExceeded {
//!             // page someone...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "skew-alert" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
