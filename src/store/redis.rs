//! Redis-backed counter store.
//!
//! Uses `redis::aio::ConnectionManager` for a multiplexed connection shared
//! across callers, and a pipeline to submit INCRBY and EXPIRE as one round
//! trip. Partial execution on transport failure is acceptable: the worst
//! outcome is a key without a fresh TTL, which idle expiry cleans up later,
//! never an over-count.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::CounterStore;

/// Configuration for the Redis counter store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

fn default_url() -> String {
    "redis://127.0.0.1/".to_string()
}

/// A counter store backed by Redis.
///
/// Cloning is cheap and shares the underlying connection, which reconnects
/// automatically after transport failures.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Connect to Redis using a configuration.
    pub async fn connect_with_config(config: &RedisStoreConfig) -> Result<Self> {
        Self::connect(&config.url).await
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn increment_and_expire(&self, key: &str, delta: i64, ttl: Duration) -> Result<i64> {
        let mut conn = self.connection.clone();

        // INCRBY and EXPIRE travel in one pipeline; ordering within the
        // pipeline matters, so the increment result is the first reply.
        let mut pipe = redis::pipe();
        pipe.incr(key, delta).expire(key, ttl.as_secs() as i64).ignore();

        let (count,): (i64,) = pipe.query_async(&mut conn).await?;
        Ok(count)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedisStoreConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1/");
    }
}
