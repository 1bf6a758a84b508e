//! App state: configuration and the lookup service.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::warn;

use ipscope_cache::{CacheConfig, ResultCache};
use ipscope_core::constants::DEFAULT_PORT;
use ipscope_core::error::Result;
use ipscope_limiter::{RateLimitConfig, RateLimiter};
use ipscope_upstream::{GeoClient, ProviderConfig, UpstreamConfig};

use crate::service::LookupService;

/// API server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Listen port
    pub port: u16,
    /// Result cache settings
    pub cache: CacheConfig,
    /// Per-client rate limit
    pub rate_limit: RateLimitConfig,
    /// Geolocation providers
    pub upstream: UpstreamConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let mut upstream = defaults.upstream;
        if let Some(url) = env_string("IPAPI_BASE_URL") {
            upstream.ipapi = ProviderConfig::new(url);
        }
        if let Some(url) = env_string("IPINFO_BASE_URL") {
            upstream.ipinfo = ProviderConfig::new(url);
        }
        if let Some(key) = env_string("IPAPI_KEY") {
            upstream = upstream.with_ipapi_key(key);
        }
        if let Some(token) = env_string("IPINFO_TOKEN") {
            upstream = upstream.with_ipinfo_token(token);
        }
        upstream.timeout_seconds = env_parse("UPSTREAM_TIMEOUT_SECS", upstream.timeout_seconds);

        Self {
            port: env_parse("PORT", defaults.port),
            cache: CacheConfig {
                max_entries: env_parse("CACHE_MAX_ENTRIES", defaults.cache.max_entries),
                ttl_seconds: env_parse("CACHE_DURATION", defaults.cache.ttl_seconds),
                sweep_interval_seconds: env_parse(
                    "CACHE_CHECK_PERIOD",
                    defaults.cache.sweep_interval_seconds,
                ),
            },
            rate_limit: RateLimitConfig {
                max_requests: env_parse("RATE_LIMIT_MAX", defaults.rate_limit.max_requests),
                window_seconds: env_parse(
                    "RATE_LIMIT_WINDOW_SECS",
                    defaults.rate_limit.window_seconds,
                ),
            },
            upstream,
        }
    }
}

/// Reads a non-blank environment variable.
fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an environment variable, falling back to `default` when unset or invalid.
fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match env_string(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "Invalid value, using default");
            default
        }),
        None => default,
    }
}

/// Shared application state.
pub struct AppState {
    /// Configuration the state was built from
    pub config: ApiConfig,
    /// Cache, limiter and upstream behind one lookup entry point
    pub service: LookupService,
    /// Wall-clock startup time, reported by `/health`
    pub started_at: DateTime<Utc>,
    /// Monotonic startup time for uptime
    pub started: Instant,
}

impl AppState {
    /// Builds the cache, limiter and upstream client from configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let cache = ResultCache::with_config(config.cache.clone());
        let limiter = RateLimiter::with_config(config.rate_limit.clone());
        let upstream = GeoClient::with_config(config.upstream.clone())?;

        let service = LookupService::new(
            Arc::new(cache),
            Arc::new(limiter),
            Arc::new(upstream),
        );

        Ok(Self::with_service(config, service))
    }

    /// Wraps an already assembled lookup service.
    pub fn with_service(config: ApiConfig, service: LookupService) -> Self {
        Self {
            config,
            service,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }
}
