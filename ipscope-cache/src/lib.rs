//! TTL result cache for ipscope lookups.
//!
//! Thread-safe in-memory cache with a fixed time-to-live, passive expiry on
//! read, and an optional active sweep.

mod cache;

pub use cache::{CacheConfig, CacheStats, ResultCache};
