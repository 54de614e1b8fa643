//! In-process fallback limiting for store outages.

use std::time::Instant;

use parking_lot::Mutex;

/// A local rate limiter consulted only when the shared store is
/// unreachable.
///
/// Implementations hold process-local state; it is never synchronized with
/// the shared store and has no per-name distinction. Any local limiting
/// strategy can be substituted here without changing the limiter's
/// contract.
pub trait FallbackLimiter: Send + Sync {
    /// Report whether one event may happen now, consuming quota if so.
    fn allow(&self) -> bool;
}

/// A token bucket: `burst` capacity, refilled at `rate` tokens per second.
///
/// Thread-safe; refill happens lazily on each query based on elapsed time,
/// so no background task is needed.
pub struct TokenBucket {
    /// Tokens added per second
    rate: f64,
    /// Maximum tokens the bucket can hold
    burst: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket that starts full.
    pub fn new(rate: f64, burst: u32) -> Self {
        Self {
            rate,
            burst: burst as f64,
            state: Mutex::new(BucketState {
                tokens: burst as f64,
                last_refill: Instant::now(),
            }),
        }
    }
}

impl FallbackLimiter for TokenBucket {
    fn allow(&self) -> bool {
        let mut state = self.state.lock();

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate).min(self.burst);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_bucket_starts_full() {
        let bucket = TokenBucket::new(1.0, 2);

        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow());
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let bucket = TokenBucket::new(50.0, 1);

        assert!(bucket.allow());
        assert!(!bucket.allow());

        // 40ms at 50 tokens/sec is two tokens' worth, capped at burst.
        std::thread::sleep(Duration::from_millis(40));
        assert!(bucket.allow());
        assert!(!bucket.allow());
    }

    #[test]
    fn test_refill_never_exceeds_burst() {
        let bucket = TokenBucket::new(1000.0, 1);

        std::thread::sleep(Duration::from_millis(20));
        assert!(bucket.allow());
        assert!(!bucket.allow());
    }
}
