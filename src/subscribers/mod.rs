//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out
//! that delivers supervisor events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                   │
//!                                                        ┌──────────┼──────────┐
//!                                                        ▼          ▼          ▼
//!                                                     Metrics    Alerts     Custom
//! ```
//!
//! Diagnostics (slow operations, tick failures, skew) are always logged through
//! `tracing` at the point of occurrence; subscribers are for programmatic reactions
//! (metrics, alerting, tests).

mod set;
mod subscribe;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;
