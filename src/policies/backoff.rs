//! # Backoff policy for restarting the background scheduler task.
//!
//! [`BackoffPolicy`] controls how restart delays grow after repeated failures.
//! The delay for attempt `n` is `first × factor^n`, clamped to `max`.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::BackoffPolicy;
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//! // 100ms × 2^10 = 102_400ms → capped at max=10s
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

/// Restart backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Initial delay before the first restart.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
}

impl Default for BackoffPolicy {
    /// `first = 500ms`, `factor = 2.0`, `max = 30s`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(500),
            max: Duration::from_secs(30),
            factor: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given attempt number (0-indexed).
    ///
    /// Non-finite or negative intermediate values clamp to [`BackoffPolicy::max`].
    pub fn next(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        if !secs.is_finite() || secs < 0.0 || secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(first_ms: u64, max_ms: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_millis(max_ms),
            factor,
        }
    }

    #[test]
    fn test_exponential_growth() {
        let p = policy(100, 30_000, 2.0);
        assert_eq!(p.next(0), Duration::from_millis(100));
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(2), Duration::from_millis(400));
        assert_eq!(p.next(3), Duration::from_millis(800));
    }

    #[test]
    fn test_constant_factor() {
        let p = policy(500, 30_000, 1.0);
        for attempt in 0..10 {
            assert_eq!(p.next(attempt), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_first_exceeds_max() {
        let p = policy(10_000, 5_000, 2.0);
        assert_eq!(p.next(0), Duration::from_millis(5_000));
    }

    #[test]
    fn test_non_finite_overflow_clamps_to_max() {
        let p = policy(100, 10_000, 2.0);
        assert_eq!(p.next(u32::MAX), Duration::from_millis(10_000));
    }
}
