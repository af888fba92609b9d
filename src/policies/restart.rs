//! # Restart policies for the background scheduler task.
//!
//! [`RestartPolicy`] determines whether the scheduler's tick task is restarted after it exits.
//!
//! ```text
//! RestartPolicy::Never      → run once; an exit (ok or err) is final
//! RestartPolicy::OnFailure  → restart with backoff after Err (default)
//! RestartPolicy::Always     → restart after any exit until stopping
//! ```

/// Policy controlling whether a background task is restarted after it exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Never restart.
    Never,
    /// Restart only on failure.
    #[default]
    OnFailure,
    /// Restart after every exit.
    Always,
}

impl RestartPolicy {
    /// Returns `true` if a task that exited with `failed` should run again.
    pub fn should_restart(self, failed: bool) -> bool {
        match self {
            RestartPolicy::Never => false,
            RestartPolicy::OnFailure => failed,
            RestartPolicy::Always => true,
        }
    }
}
