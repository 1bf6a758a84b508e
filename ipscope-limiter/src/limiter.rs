//! Fixed-window rate limiter keyed by caller identity.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ipscope_core::clock::{Clock, SystemClock};
use ipscope_core::constants::{DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_SECS};

/// Rate limiter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests admitted per identity per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX,
            window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECS,
        }
    }
}

impl RateLimitConfig {
    /// Window length.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Request counter for one identity.
#[derive(Clone, Debug)]
struct RateLimitWindow {
    window_start: Instant,
    count: u32,
}

impl RateLimitWindow {
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }

    fn reset_after(&self, now: Instant, window: Duration) -> Duration {
        (self.window_start + window).saturating_duration_since(now)
    }
}

/// Outcome of an admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Configured quota
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Time until the current window resets
    pub reset_after: Duration,
}

/// Per-identity rate limiter.
///
/// Windows are created lazily on an identity's first request and reset
/// (rather than accumulate) once their duration has elapsed. All operations
/// are thread-safe.
pub struct RateLimiter {
    windows: DashMap<String, RateLimitWindow>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    /// Creates a limiter with custom configuration.
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock::shared())
    }

    /// Creates a limiter reading time from the given clock.
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            config,
            clock,
        }
    }

    /// Returns the limiter configuration.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Returns true if the request from `identity` is admitted.
    pub fn admit(&self, identity: &str) -> bool {
        self.check(identity).allowed
    }

    /// Counts a request from `identity` and decides whether to admit it.
    ///
    /// Rejected requests are not counted, so a window's count never
    /// exceeds the quota.
    pub fn check(&self, identity: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let window = self.config.window();
        let limit = self.config.max_requests;

        let mut entry = self
            .windows
            .entry(identity.to_string())
            .or_insert_with(|| RateLimitWindow {
                window_start: now,
                count: 0,
            });
        let state = entry.value_mut();

        if state.is_expired(now, window) {
            debug!(identity, "Rate limit window reset");
            state.window_start = now;
            state.count = 0;
        }

        let allowed = state.count < limit;
        if allowed {
            state.count += 1;
        } else {
            warn!(identity, limit, "Rate limit exceeded");
        }

        RateLimitDecision {
            allowed,
            limit,
            remaining: limit.saturating_sub(state.count),
            reset_after: state.reset_after(now, window),
        }
    }

    /// Drops windows that have already expired.
    ///
    /// Returns the number of identities removed. An evicted identity simply
    /// starts a fresh window on its next request.
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let window = self.config.window();

        let before = self.windows.len();
        self.windows.retain(|_, state| !state.is_expired(now, window));
        before.saturating_sub(self.windows.len())
    }

    /// Number of identities currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
