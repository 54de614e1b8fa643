//! Rategate - Distributed Rate Limiting
//!
//! This crate implements a distributed rate limiter: it decides whether an
//! event identified by a name may happen now, given a maximum allowed
//! frequency, by consulting counters held in a store shared across every
//! process making the decision. Counters are addressed by deterministic
//! time-slot keys, so a fleet of stateless workers enforces one consistent
//! limit without any coordination beyond the store's per-key atomicity.
//!
//! Two limiting modes are provided: a fixed quota per explicit period
//! ([`Limiter::allow_n`] and its shorthands) and a continuous per-second
//! rate ([`Limiter::allow_rate`]). When the shared store is unreachable,
//! decisions degrade to an optional in-process [`FallbackLimiter`].

pub mod error;
pub mod ratelimit;
pub mod store;

pub use error::{Error, Result};
pub use ratelimit::{Decision, FallbackLimiter, Limiter, Rate, RateDecision, TokenBucket};
pub use store::{CounterStore, RedisStore, RedisStoreConfig};
