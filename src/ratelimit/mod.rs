//! Rate limiting logic: slot derivation, decision operations, and the
//! in-process fallback path.

mod fallback;
mod limiter;
mod slot;

pub use fallback::{FallbackLimiter, TokenBucket};
pub use limiter::{Decision, Limiter, RateDecision};
pub use slot::Rate;
