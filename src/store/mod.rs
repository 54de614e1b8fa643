//! Shared counter store abstraction and backends.

mod redis;

pub use self::redis::{RedisStore, RedisStoreConfig};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Capability interface to the shared counter store.
///
/// This trait abstracts over the store holding the distributed counters so
/// the limiter can work against any backend offering atomic per-key
/// increments. Implementations must never fall back to read-modify-write:
/// concurrent incrementers on the same key must not lose updates.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` by `delta` and refresh its expiry to `ttl`.
    ///
    /// Both operations must be submitted together in a single round trip so
    /// that a crash between them cannot leave a counted key without an
    /// expiry. Returns the post-increment value.
    async fn increment_and_expire(&self, key: &str, delta: i64, ttl: Duration) -> Result<i64>;

    /// Delete `key`, removing its counter entirely.
    async fn delete(&self, key: &str) -> Result<()>;
}
