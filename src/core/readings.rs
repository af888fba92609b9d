//! Status readings the supervisor keeps in the state store.
//!
//! All three live in the [`ADMIN_NAMESPACE`]: the version and boot time are seeded once
//! during bootstrap, the uptime is rewritten by the last step of every tick.

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use chrono_tz::Tz;

pub const ADMIN_NAMESPACE: &str = "admin";
/// Namespace receiving the runtime-started event.
pub const GLOBAL_NAMESPACE: &str = "global";
/// Caller name used for `set_state` writes made by the supervisor.
pub const SUPERVISOR_CALLER: &str = "_supervisor";

pub const VERSION_ENTITY: &str = "sensor.runtime_version";
pub const UPTIME_ENTITY: &str = "sensor.runtime_uptime";
pub const BOOTED_ENTITY: &str = "sensor.runtime_booted";

/// Version string seeded into [`VERSION_ENTITY`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whole-second difference between scheduler times; never negative.
pub fn uptime_between(booted_at: DateTime<Utc>, now: DateTime<Utc>) -> TimeDelta {
    let delta = now.trunc_subsecs(0) - booted_at.trunc_subsecs(0);
    delta.max(TimeDelta::zero())
}

/// Renders a duration as `H:MM:SS`, prefixed by `N day(s), ` past 24 hours.
pub fn format_uptime(uptime: TimeDelta) -> String {
    let secs = uptime.num_seconds().max(0);
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (h, m, s) = (rem / 3_600, rem % 3_600 / 60, rem % 60);
    match days {
        0 => format!("{h}:{m:02}:{s:02}"),
        1 => format!("1 day, {h}:{m:02}:{s:02}"),
        n => format!("{n} days, {h}:{m:02}:{s:02}"),
    }
}

/// Boot time truncated to whole seconds, rendered in `tz` as RFC 3339.
pub fn format_boot_time(booted_at: DateTime<Utc>, tz: Tz) -> String {
    booted_at
        .trunc_subsecs(0)
        .with_timezone(&tz)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn uptime_formats() {
        assert_eq!(format_uptime(TimeDelta::zero()), "0:00:00");
        assert_eq!(format_uptime(TimeDelta::seconds(3_725)), "1:02:05");
        assert_eq!(format_uptime(TimeDelta::seconds(86_400 + 61)), "1 day, 0:01:01");
        assert_eq!(
            format_uptime(TimeDelta::seconds(3 * 86_400 + 23 * 3_600)),
            "3 days, 23:00:00"
        );
    }

    #[test]
    fn uptime_ignores_subseconds_and_clamps() {
        let booted = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + TimeDelta::milliseconds(900);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 10).unwrap()
            + TimeDelta::milliseconds(100);
        assert_eq!(uptime_between(booted, now), TimeDelta::seconds(10));
        assert_eq!(uptime_between(now, booted), TimeDelta::zero());
    }

    #[test]
    fn boot_time_uses_configured_zone() {
        let booted = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()
            + TimeDelta::milliseconds(250);
        assert_eq!(
            format_boot_time(booted, Tz::UTC),
            "2024-01-15T08:30:00+00:00"
        );
        assert_eq!(
            format_boot_time(booted, chrono_tz::Europe::Berlin),
            "2024-01-15T09:30:00+01:00"
        );
    }
}
