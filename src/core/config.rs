//! # Runtime configuration.
//!
//! Provides [`RuntimeConfig`], the immutable settings the supervisor is built with.
//! It is loaded once before the supervisor starts and outlives it.
//!
//! Config is built in one of two ways:
//! 1. **In code**: `RuntimeConfig::default()` and field overrides.
//! 2. **From the environment**: [`RuntimeConfig::from_env`] (`TICKVISOR_*` variables).
//!
//! ## Sentinel values
//! - `tick_delay = 0s` → next tick starts right after the previous one ends
//! - `slow_op_threshold = 0s` → every timed operation that takes any time is reported

use std::time::Duration;

use chrono_tz::Tz;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, RestartPolicy, StarvationPolicy};

/// Global configuration for the supervisor.
///
/// ## Field semantics
/// - `apps_enabled`: drive the application layer (bootstrap load, per-tick reconcile, drain)
/// - `production_mode`: skip per-tick app reconciliation (apps load once at bootstrap)
/// - `realtime_mode`: the scheduler runs on the wall clock; skew is only checked in this mode
/// - `tick_delay`: pause after each tick, measured from the tick's end
/// - `max_skew`: tick duration budget; longer ticks are reported
/// - `slow_op_threshold`: a single timed operation longer than this is reported
/// - `profile_on_skew`: dump app-layer profiling stats alongside skew warnings
/// - `time_zone`: zone used to render the boot-time reading
/// - `starvation`: rolling queue-depth window handed to thread-pool implementations
/// - `scheduler_restart` / `scheduler_backoff`: supervision of the scheduler tick task
/// - `bus_capacity`: internal event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub apps_enabled: bool,
    pub production_mode: bool,
    pub realtime_mode: bool,
    pub tick_delay: Duration,
    pub max_skew: Duration,
    pub slow_op_threshold: Duration,
    pub profile_on_skew: bool,
    pub time_zone: Tz,
    pub starvation: StarvationPolicy,
    pub scheduler_restart: RestartPolicy,
    pub scheduler_backoff: BackoffPolicy,
    pub bus_capacity: usize,
}

impl Default for RuntimeConfig {
    /// Default configuration:
    ///
    /// - apps enabled, development mode, realtime
    /// - `tick_delay = 1s`, `max_skew = 2s`, `slow_op_threshold = 1s`
    /// - UTC, default starvation window (50 callbacks / 10 ticks / every 60 ticks)
    /// - scheduler restarted on failure with default backoff
    fn default() -> Self {
        let tick_delay = Duration::from_secs(1);
        Self {
            apps_enabled: true,
            production_mode: false,
            realtime_mode: true,
            tick_delay,
            max_skew: tick_delay * 2,
            slow_op_threshold: Duration::from_secs(1),
            profile_on_skew: false,
            time_zone: Tz::UTC,
            starvation: StarvationPolicy::default(),
            scheduler_restart: RestartPolicy::default(),
            scheduler_backoff: BackoffPolicy::default(),
            bus_capacity: 1024,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional; unset ones keep their [`Default`] value.
    /// - `TICKVISOR_APPS`, `TICKVISOR_PRODUCTION_MODE`, `TICKVISOR_REALTIME`,
    ///   `TICKVISOR_PROFILE_ON_SKEW`: booleans (`true/false/1/0/yes/no/on/off`)
    /// - `TICKVISOR_TICK_DELAY_MS`, `TICKVISOR_MAX_SKEW_MS`, `TICKVISOR_SLOW_OP_MS`: milliseconds
    /// - `TICKVISOR_TIME_ZONE`: IANA zone name, e.g. `Europe/Berlin`
    /// - `TICKVISOR_QSIZE_WARNING_THRESHOLD`, `TICKVISOR_QSIZE_WARNING_ITERATIONS`,
    ///   `TICKVISOR_QSIZE_WARNING_STEP`: starvation window
    /// - `TICKVISOR_BUS_CAPACITY`: event bus capacity
    ///
    /// If `TICKVISOR_TICK_DELAY_MS` is set and `TICKVISOR_MAX_SKEW_MS` is not, the skew
    /// budget follows the delay (twice its value).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("TICKVISOR_APPS") {
            cfg.apps_enabled = parse_bool("TICKVISOR_APPS", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_PRODUCTION_MODE") {
            cfg.production_mode = parse_bool("TICKVISOR_PRODUCTION_MODE", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_REALTIME") {
            cfg.realtime_mode = parse_bool("TICKVISOR_REALTIME", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_PROFILE_ON_SKEW") {
            cfg.profile_on_skew = parse_bool("TICKVISOR_PROFILE_ON_SKEW", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_TICK_DELAY_MS") {
            cfg.tick_delay = parse_millis("TICKVISOR_TICK_DELAY_MS", &v)?;
            cfg.max_skew = cfg.tick_delay * 2;
        }
        if let Some(v) = lookup("TICKVISOR_MAX_SKEW_MS") {
            cfg.max_skew = parse_millis("TICKVISOR_MAX_SKEW_MS", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_SLOW_OP_MS") {
            cfg.slow_op_threshold = parse_millis("TICKVISOR_SLOW_OP_MS", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_TIME_ZONE") {
            cfg.time_zone = v.trim().parse().map_err(|_| {
                ConfigError::Invalid("TICKVISOR_TIME_ZONE", "must be an IANA time zone name")
            })?;
        }
        if let Some(v) = lookup("TICKVISOR_QSIZE_WARNING_THRESHOLD") {
            cfg.starvation.threshold = parse_num("TICKVISOR_QSIZE_WARNING_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_QSIZE_WARNING_ITERATIONS") {
            cfg.starvation.iterations = parse_num("TICKVISOR_QSIZE_WARNING_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_QSIZE_WARNING_STEP") {
            cfg.starvation.step = parse_num("TICKVISOR_QSIZE_WARNING_STEP", &v)?;
        }
        if let Some(v) = lookup("TICKVISOR_BUS_CAPACITY") {
            cfg.bus_capacity = parse_num("TICKVISOR_BUS_CAPACITY", &v)?;
        }

        Ok(cfg)
    }

    /// Whether each tick reconciles the app layer.
    #[inline]
    pub fn reconcile_apps_each_tick(&self) -> bool {
        self.apps_enabled && !self.production_mode
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(key, "must be a boolean")),
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::Invalid(key, "must be a non-negative integer (ms)"))
}

fn parse_num<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid(key, "must be a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<RuntimeConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let cfg = load(&[]).unwrap();
        assert!(cfg.apps_enabled);
        assert!(!cfg.production_mode);
        assert!(cfg.realtime_mode);
        assert_eq!(cfg.tick_delay, Duration::from_secs(1));
        assert_eq!(cfg.max_skew, Duration::from_secs(2));
        assert_eq!(cfg.slow_op_threshold, Duration::from_secs(1));
        assert_eq!(cfg.time_zone, Tz::UTC);
        assert_eq!(cfg.starvation, StarvationPolicy::default());
    }

    #[test]
    fn test_config_overrides() {
        let cfg = load(&[
            ("TICKVISOR_APPS", "no"),
            ("TICKVISOR_PRODUCTION_MODE", "1"),
            ("TICKVISOR_REALTIME", "false"),
            ("TICKVISOR_TICK_DELAY_MS", "250"),
            ("TICKVISOR_SLOW_OP_MS", "100"),
            ("TICKVISOR_PROFILE_ON_SKEW", "on"),
            ("TICKVISOR_TIME_ZONE", "Europe/Berlin"),
            ("TICKVISOR_QSIZE_WARNING_THRESHOLD", "7"),
            ("TICKVISOR_QSIZE_WARNING_ITERATIONS", "2"),
            ("TICKVISOR_QSIZE_WARNING_STEP", "5"),
        ])
        .unwrap();

        assert!(!cfg.apps_enabled);
        assert!(cfg.production_mode);
        assert!(!cfg.realtime_mode);
        assert!(cfg.profile_on_skew);
        assert_eq!(cfg.tick_delay, Duration::from_millis(250));
        assert_eq!(cfg.max_skew, Duration::from_millis(500));
        assert_eq!(cfg.slow_op_threshold, Duration::from_millis(100));
        assert_eq!(cfg.time_zone, chrono_tz::Europe::Berlin);
        assert_eq!(
            cfg.starvation,
            StarvationPolicy {
                threshold: 7,
                iterations: 2,
                step: 5
            }
        );
    }

    #[test]
    fn test_explicit_skew_wins_over_derived() {
        let cfg = load(&[
            ("TICKVISOR_TICK_DELAY_MS", "0"),
            ("TICKVISOR_MAX_SKEW_MS", "1000"),
        ])
        .unwrap();
        assert_eq!(cfg.tick_delay, Duration::ZERO);
        assert_eq!(cfg.max_skew, Duration::from_millis(1000));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert_eq!(
            load(&[("TICKVISOR_REALTIME", "maybe")]).unwrap_err(),
            ConfigError::Invalid("TICKVISOR_REALTIME", "must be a boolean")
        );
        assert!(matches!(
            load(&[("TICKVISOR_TICK_DELAY_MS", "-5")]),
            Err(ConfigError::Invalid("TICKVISOR_TICK_DELAY_MS", _))
        ));
        assert!(matches!(
            load(&[("TICKVISOR_TIME_ZONE", "Mars/Olympus")]),
            Err(ConfigError::Invalid("TICKVISOR_TIME_ZONE", _))
        ));
    }

    #[test]
    fn test_production_mode_disables_per_tick_reconcile() {
        let mut cfg = RuntimeConfig::default();
        assert!(cfg.reconcile_apps_each_tick());
        cfg.production_mode = true;
        assert!(!cfg.reconcile_apps_each_tick());
        cfg.production_mode = false;
        cfg.apps_enabled = false;
        assert!(!cfg.reconcile_apps_each_tick());
    }
}
