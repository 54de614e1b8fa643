//! Core distributed limiter implementation.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::store::CounterStore;

use super::fallback::FallbackLimiter;
use super::slot::{limit_period, quota_key, rate_key, unix_now_nanos, unix_now_secs, Rate};

/// Extra expiry added beyond a counter's window so slightly late readers
/// still observe it before idle expiry cleans it up.
const EXPIRY_GRACE: Duration = Duration::from_secs(30);

/// Outcome of a fixed-quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Post-increment counter value for the current window. Zero when the
    /// store was unreachable and the decision was degraded to the fallback
    /// path.
    pub count: i64,
    /// Time until the start of the next window, usable as a retry hint
    /// regardless of outcome.
    pub delay: Duration,
    /// Whether the event may happen now.
    pub allow: bool,
}

/// Outcome of a continuous-rate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Time until the counter resets; zero when allowed.
    pub delay: Duration,
    /// Whether the event may happen now.
    pub allow: bool,
}

/// Controls how frequently events are allowed to happen, coordinating
/// through a shared counter store.
///
/// The limiter holds no tasks or internal state of its own beyond the
/// optional fallback limiter; any number of callers across processes and
/// machines may check the same name concurrently, serialized only by the
/// store's per-key atomic increments.
pub struct Limiter<S> {
    store: S,
    /// Optional fallback limiter used when the store is unavailable.
    fallback: Option<Box<dyn FallbackLimiter>>,
}

impl<S: CounterStore> Limiter<S> {
    /// Create a new limiter with no fallback: store failures deny.
    pub fn new(store: S) -> Self {
        Self {
            store,
            fallback: None,
        }
    }

    /// Attach a fallback limiter consulted when the store is unreachable.
    ///
    /// The fallback is private to this limiter instance and must not be
    /// shared across instances that are meant to behave independently.
    pub fn with_fallback(mut self, fallback: impl FallbackLimiter + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Report whether an event with the given name may happen now.
    ///
    /// Allows up to `max_count` events within each `period`-long aligned
    /// window, with this call incrementing the window's counter by `n`.
    /// The counter increases even when the event is denied; pass `n = 0`
    /// to peek without consuming quota.
    ///
    /// Store failures are absorbed: the decision degrades to the fallback
    /// limiter's verdict (deny when none is configured) with a sentinel
    /// `count` of zero.
    pub async fn allow_n(&self, name: &str, max_count: i64, period: Duration, n: i64) -> Decision {
        debug_assert!(!name.is_empty(), "event name must be non-empty");
        debug_assert!(
            period.as_secs() > 0,
            "fixed-quota period must be at least one second"
        );

        let secs = period.as_secs() as i64;
        let now = unix_now_secs();
        let slot = now / secs;
        let delay = Duration::from_secs(((slot + 1) * secs - now) as u64);

        // Pre-compute the fallback verdict; it only stands if the store
        // call fails.
        let mut allow = match &self.fallback {
            Some(fallback) => fallback.allow(),
            None => false,
        };

        let key = quota_key(name, slot);
        let mut count = 0;
        match self
            .store
            .increment_and_expire(&key, n, period + EXPIRY_GRACE)
            .await
        {
            Ok(value) => {
                count = value;
                allow = count <= max_count;
            }
            Err(e) => {
                warn!(
                    name = %name,
                    error = %e,
                    "Store unreachable, degrading to fallback decision"
                );
            }
        }

        trace!(
            name = %name,
            slot = slot,
            count = count,
            allow = allow,
            "Checked fixed-quota limit"
        );
        if !allow {
            debug!(
                name = %name,
                count = count,
                max_count = max_count,
                "Rate limit exceeded"
            );
        }

        Decision {
            count,
            delay,
            allow,
        }
    }

    /// Shorthand for [`allow_n`](Self::allow_n) with `n = 1`.
    pub async fn allow(&self, name: &str, max_count: i64, period: Duration) -> Decision {
        self.allow_n(name, max_count, period, 1).await
    }

    /// Shorthand for [`allow`](Self::allow) with a one-minute period.
    pub async fn allow_minute(&self, name: &str, max_count: i64) -> Decision {
        self.allow(name, max_count, Duration::from_secs(60)).await
    }

    /// Shorthand for [`allow`](Self::allow) with a one-hour period.
    pub async fn allow_hour(&self, name: &str, max_count: i64) -> Decision {
        self.allow(name, max_count, Duration::from_secs(3600)).await
    }

    /// Report whether an event may happen now, allowing up to `rate`
    /// events per second on average.
    ///
    /// The rate is normalized to an equivalent window: one second for
    /// rates of at least one per second, stretched otherwise. When denied,
    /// the returned delay is the time remaining until the window's counter
    /// resets.
    pub async fn allow_rate(&self, name: &str, rate: Rate) -> RateDecision {
        debug_assert!(!name.is_empty(), "event name must be non-empty");

        if rate.is_zero() {
            return RateDecision {
                delay: Duration::ZERO,
                allow: false,
            };
        }
        if rate.is_infinite() {
            return RateDecision {
                delay: Duration::ZERO,
                allow: true,
            };
        }

        let (limit, period) = limit_period(rate);
        let period_ns = period.as_nanos() as i64;
        let now_ns = unix_now_nanos();
        let slot = now_ns / period_ns;

        let key = rate_key(name, period, slot);
        let allow = match self
            .store
            .increment_and_expire(&key, 1, period + EXPIRY_GRACE)
            .await
        {
            Ok(count) => count <= limit,
            Err(e) => {
                warn!(
                    name = %name,
                    error = %e,
                    "Store unreachable, degrading to fallback decision"
                );
                match &self.fallback {
                    Some(fallback) => fallback.allow(),
                    None => false,
                }
            }
        };

        let delay = if allow {
            Duration::ZERO
        } else {
            debug!(name = %name, limit = limit, "Rate limit exceeded");
            Duration::from_nanos(((slot + 1) * period_ns - now_ns) as u64)
        };

        RateDecision { delay, allow }
    }

    /// Clear the fixed-quota counter for the current window.
    ///
    /// Only the current slot's key is deleted, not historical ones; those
    /// expire on their own. Store errors surface to the caller and are not
    /// retried.
    pub async fn reset(&self, name: &str, period: Duration) -> Result<()> {
        debug_assert!(
            period.as_secs() > 0,
            "fixed-quota period must be at least one second"
        );

        let secs = period.as_secs() as i64;
        let slot = unix_now_secs() / secs;
        self.store.delete(&quota_key(name, slot)).await
    }

    /// Clear the continuous-rate counter for the current window.
    ///
    /// No-op for zero or infinite rates, which have no backing key.
    pub async fn reset_rate(&self, name: &str, rate: Rate) -> Result<()> {
        if rate.is_zero() || rate.is_infinite() {
            return Ok(());
        }

        let (_, period) = limit_period(rate);
        let slot = unix_now_nanos() / period.as_nanos() as i64;
        self.store.delete(&rate_key(name, period, slot)).await
    }
}
