//! Runtime core: readiness, bootstrap, maintenance and shutdown.
//!
//! The public entry point is [`Supervisor`], built through [`SupervisorBuilder`].
//!
//! Internal modules:
//! - [`gate`]: readiness gate (plugins ready, metadata present);
//! - [`bootstrap`]: one-time ordered initialization;
//! - [`maintenance`]: the ordered per-tick steps and their failure boundary;
//! - [`timing`]: slow-operation reporting around a single step;
//! - [`drift`]: after-the-fact tick skew check;
//! - [`background`]: supervision of the scheduler's own tick task;
//! - [`shutdown`]: OS signals and the drain sequence;
//! - [`supervisor`]: the loop tying it together.

mod background;
mod bootstrap;
mod builder;
mod config;
mod drift;
mod gate;
mod maintenance;
mod readings;
mod shutdown;
mod state;
mod supervisor;
mod timing;

pub use builder::SupervisorBuilder;
pub use config::RuntimeConfig;
pub use drift::{SkewViolation, TickReport, check_drift};
pub use gate::ReadyOutcome;
pub use maintenance::{MaintenanceSchedule, MaintenanceStep, TickFailure};
pub use readings::{
    ADMIN_NAMESPACE, BOOTED_ENTITY, GLOBAL_NAMESPACE, SUPERVISOR_CALLER, UPTIME_ENTITY, VERSION,
    VERSION_ENTITY, format_boot_time, format_uptime, uptime_between,
};
pub use shutdown::wait_for_shutdown_signal;
pub use state::{StopHandle, StopHook};
pub use supervisor::Supervisor;
pub use timing::timed;
