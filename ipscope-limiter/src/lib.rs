//! Per-identity admission control for ipscope.
//!
//! Each caller identity (normally its network address) gets a counter that
//! resets once its window elapses. Rejection is immediate; there is no
//! queueing or backoff.

mod limiter;

pub use limiter::{RateLimitConfig, RateLimitDecision, RateLimiter};
