//! Restart, backoff and starvation policies.
//!
//! ## Contents
//! - [`RestartPolicy`] when to restart the background scheduler task
//! - [`BackoffPolicy`] how restart delays evolve (first / factor / max)
//! - [`StarvationPolicy`] rolling queue-depth window used by `check_q_size`
//!
//! ## Quick wiring
//! ```text
//! RuntimeConfig { scheduler_restart, scheduler_backoff, starvation, .. }
//!      ├─► core::background::BackgroundActor  (restart + backoff)
//!      └─► ThreadPool::check_q_size impls     (starvation.assess)
//! ```

mod backoff;
mod restart;
mod starvation;

pub use backoff::BackoffPolicy;
pub use restart::RestartPolicy;
pub use starvation::{StarvationAssessment, StarvationPolicy, WarningCounters};
