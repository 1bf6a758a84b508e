//! Response headers for rate-limit state and cache status.

use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use ipscope_limiter::RateLimitDecision;

/// Request quota for the current window.
pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
/// Requests left in the current window.
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
/// Seconds until the window resets.
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");
/// `HIT` or `MISS`.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Whole seconds, rounded up so clients never retry early.
pub fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// Writes the `RateLimit-*` triple.
pub fn insert_rate_limit(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_after: Duration) {
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(ceil_secs(reset_after)));
}

/// Headers for an admitted lookup.
pub fn lookup_headers(decision: &RateLimitDecision, from_cache: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_rate_limit(
        &mut headers,
        decision.limit,
        decision.remaining,
        decision.reset_after,
    );
    headers.insert(
        X_CACHE,
        HeaderValue::from_static(if from_cache { "HIT" } else { "MISS" }),
    );
    headers
}
