//! Error types for Rategate operations.

use thiserror::Error;

/// Main error type for Rategate operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Shared counter store (Redis) errors
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),

    /// Errors raised by non-Redis store implementations
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type alias for Rategate operations.
pub type Result<T> = std::result::Result<T, Error>;
