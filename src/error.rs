//! Error types used by the tickvisor runtime and its collaborators.
//!
//! This module defines three enums:
//!
//! - [`RuntimeError`]: errors raised by the supervisor itself (fatal bootstrap failures, misuse).
//! - [`OpError`]: errors raised by a single collaborator call or maintenance step.
//! - [`ConfigError`]: invalid environment-derived configuration.
//!
//! `RuntimeError` and `OpError` provide helper methods (`as_label`, `as_message`) for logs/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by the supervisor runtime.
///
/// Only the bootstrap path and misuse of the supervisor end up here; failures inside
/// a maintenance tick are contained at the tick boundary and never surface as a `RuntimeError`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A one-time bootstrap step failed; the runtime cannot reach a ready state.
    #[error("bootstrap step `{step}` failed: {source}")]
    Bootstrap {
        /// Name of the bootstrap step that failed.
        step: &'static str,
        /// The underlying collaborator error.
        #[source]
        source: OpError,
    },

    /// The builder was asked to build without a required collaborator.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// `Supervisor::run` was called more than once.
    #[error("supervisor is already running or has already run")]
    AlreadyRunning,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::RuntimeError;
    ///
    /// let err = RuntimeError::MissingCollaborator("scheduler");
    /// assert_eq!(err.as_label(), "runtime_missing_collaborator");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Bootstrap { .. } => "runtime_bootstrap_failed",
            RuntimeError::MissingCollaborator(_) => "runtime_missing_collaborator",
            RuntimeError::AlreadyRunning => "runtime_already_running",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Bootstrap { step, source } => {
                format!("bootstrap failed at {step}: {}", source.as_message())
            }
            RuntimeError::MissingCollaborator(what) => format!("collaborator not set: {what}"),
            RuntimeError::AlreadyRunning => "run() called twice".to_string(),
        }
    }
}

/// # Errors produced by collaborator calls.
///
/// Every maintenance step and every bootstrap suspension point returns `Result<_, OpError>`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// The operation ran and failed.
    #[error("operation failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The collaborator could not be reached (disconnected plugin, closed store, ...).
    #[error("{component} unavailable")]
    Unavailable {
        /// Name of the component that is not reachable.
        component: String,
    },

    /// The operation panicked; the panic was caught at the step boundary.
    #[error("operation panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl OpError {
    /// Shorthand for [`OpError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        OpError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`OpError::Unavailable`].
    pub fn unavailable(component: impl Into<String>) -> Self {
        OpError::Unavailable {
            component: component.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::OpError;
    ///
    /// let err = OpError::fail("boom");
    /// assert_eq!(err.as_label(), "op_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            OpError::Fail { .. } => "op_failed",
            OpError::Unavailable { .. } => "op_unavailable",
            OpError::Panicked { .. } => "op_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            OpError::Fail { error } => format!("error: {error}"),
            OpError::Unavailable { component } => format!("unavailable: {component}"),
            OpError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Converts a caught panic payload into [`OpError::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        OpError::Panicked {
            info: panic_info(&*payload),
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_error_keeps_source() {
        let err = RuntimeError::Bootstrap {
            step: "create_initial_threads",
            source: OpError::fail("no threads"),
        };
        assert_eq!(err.as_label(), "runtime_bootstrap_failed");
        assert!(err.to_string().contains("create_initial_threads"));
        assert!(err.as_message().contains("no threads"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn op_error_labels_are_stable() {
        assert_eq!(OpError::unavailable("hass").as_label(), "op_unavailable");
        assert_eq!(
            OpError::Panicked { info: "x".into() }.as_label(),
            "op_panicked"
        );
        assert_eq!(OpError::unavailable("hass").to_string(), "hass unavailable");
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let err = OpError::from_panic(Box::new("static boom"));
        assert_eq!(err, OpError::Panicked { info: "static boom".into() });

        let err = OpError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.as_message(), "panic: owned boom");

        let err = OpError::from_panic(Box::new(42_u8));
        assert_eq!(err.as_message(), "panic: unknown panic");
    }
}
