//! Time-slot derivation and counter-key construction.
//!
//! Every caller computes the current slot independently from wall-clock
//! time and the policy's period, so all callers using the same period agree
//! on slot boundaries without coordination. Keys embed the slot number, so
//! different slots always map to different keys and stale slots self-clean
//! through idle expiry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Namespace prefix distinguishing this crate's keys from unrelated data in
/// the same store. Part of the wire format: deployments sharing one store
/// across implementations rely on it.
const KEY_PREFIX: &str = "rate";

/// A continuous rate limit in events per second.
///
/// `Rate(0)` always denies and [`Rate::INF`] always allows; neither has a
/// backing counter in the store.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Rate(f64);

impl Rate {
    /// A rate that allows every event.
    pub const INF: Rate = Rate(f64::INFINITY);

    /// `n` events per second.
    pub fn per_second(n: f64) -> Self {
        debug_assert!(n >= 0.0, "rate limit must be non-negative");
        Rate(n)
    }

    /// `n` events per minute.
    pub fn per_minute(n: f64) -> Self {
        Self::per_second(n / 60.0)
    }

    /// `n` events per hour.
    pub fn per_hour(n: f64) -> Self {
        Self::per_second(n / 3600.0)
    }

    /// The rate in events per second.
    pub fn events_per_second(&self) -> f64 {
        self.0
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    pub(crate) fn is_infinite(&self) -> bool {
        self.0.is_infinite()
    }
}

/// Normalize a continuous rate to an equivalent `(limit, period)` pair.
///
/// Rates of one per second or faster keep a one-second period and take the
/// whole-event limit. Slower rates stretch the period instead, with a limit
/// of one, so a counter still exists per window.
pub(crate) fn limit_period(rate: Rate) -> (i64, Duration) {
    if rate.0 < 1.0 {
        (1, Duration::from_secs((1.0 / rate.0) as u64))
    } else {
        (rate.0 as i64, Duration::from_secs(1))
    }
}

/// Counter key for fixed-quota mode: `"rate:{name}-{slot}"`.
pub(crate) fn quota_key(name: &str, slot: i64) -> String {
    format!("{}:{}-{}", KEY_PREFIX, name, slot)
}

/// Counter key for continuous-rate mode: `"rate:{name}-{period_ns}-{slot}"`.
///
/// The period magnitude disambiguates equal slot numbers produced by
/// different periods.
pub(crate) fn rate_key(name: &str, period: Duration, slot: i64) -> String {
    format!("{}:{}-{}-{}", KEY_PREFIX, name, period.as_nanos(), slot)
}

/// Seconds since the Unix epoch.
pub(crate) fn unix_now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Nanoseconds since the Unix epoch.
pub(crate) fn unix_now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as i64
}
