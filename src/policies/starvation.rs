//! # Rolling thread-starvation check.
//!
//! [`StarvationPolicy`] turns a per-tick sample of total worker queue depth into a
//! warning decision that depends on a **window** of ticks, not a single sample.
//! Thread-pool collaborators use it to implement
//! [`ThreadPool::check_q_size`](crate::ThreadPool::check_q_size); the supervisor threads
//! the returned [`WarningCounters`] into the next tick.
//!
//! ```text
//! depth > threshold:
//!     warn = (step == 0 && iterations >= N) || iterations == N
//!     if warn { step = 0 }
//!     step += 1; iterations += 1
//!     if step >= policy.step { step = 0 }
//! otherwise:
//!     step = 0; iterations = 0
//! ```
//!
//! A streak warns for the first time on the tick after `N` consecutive over-threshold
//! samples, then once every `step` ticks while it lasts. A single spike never warns
//! (for `N >= 1`), and any healthy sample resets the window.

/// Counters carried from one tick to the next by the supervisor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarningCounters {
    /// Position inside the re-warn cadence.
    pub step: u32,
    /// Consecutive over-threshold ticks.
    pub iterations: u32,
}

/// Outcome of a single starvation assessment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StarvationAssessment {
    /// Counters for the next tick.
    pub counters: WarningCounters,
    /// `true` if the caller should report possible starvation now.
    pub warn: bool,
}

/// Thresholds for the rolling queue-depth check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StarvationPolicy {
    /// Total queued callbacks above which a tick counts as over-threshold.
    pub threshold: usize,
    /// Consecutive over-threshold ticks tolerated before the first warning.
    pub iterations: u32,
    /// Re-warn cadence (in ticks) while the streak lasts.
    pub step: u32,
}

impl Default for StarvationPolicy {
    fn default() -> Self {
        Self {
            threshold: 50,
            iterations: 10,
            step: 60,
        }
    }
}

impl StarvationPolicy {
    /// Folds one queue-depth sample into the window.
    pub fn assess(&self, counters: WarningCounters, total_depth: usize) -> StarvationAssessment {
        if total_depth <= self.threshold {
            return StarvationAssessment {
                counters: WarningCounters::default(),
                warn: false,
            };
        }

        let WarningCounters {
            mut step,
            mut iterations,
        } = counters;

        let warn = (step == 0 && iterations >= self.iterations) || iterations == self.iterations;
        if warn {
            step = 0;
        }
        step += 1;
        iterations = iterations.saturating_add(1);
        if step >= self.step {
            step = 0;
        }

        StarvationAssessment {
            counters: WarningCounters { step, iterations },
            warn,
        }
    }
}
