//! Defaults shared across the ipscope crates.
//!
//! Every value here can be overridden through configuration; these are the
//! values used when nothing is configured.

// ═══════════════════════════════════════════════════════════════════════════════
// SERVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Default HTTP listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// Banner returned by `GET /`.
pub const API_BANNER: &str = "IP Address Finder API";

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Default cache entry time-to-live (1 hour).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default interval between active sweeps of expired entries.
pub const DEFAULT_CACHE_SWEEP_SECS: u64 = 120;

/// Default upper bound on cached records.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Display form of the "caller's own address" lookup key.
pub const OWN_ADDRESS_KEY: &str = "ip-self";

/// Prefix of the display form of explicit-address lookup keys.
pub const ADDRESS_KEY_PREFIX: &str = "ip-";

// ═══════════════════════════════════════════════════════════════════════════════
// RATE LIMITING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default number of requests admitted per identity per window.
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;

/// Default rate-limit window (15 minutes).
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

/// Error text returned to throttled callers.
pub const THROTTLE_MESSAGE: &str = "Too many requests, please try again later.";

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM PROVIDERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Primary provider base URL.
pub const IPAPI_BASE_URL: &str = "https://ipapi.co";

/// Query parameter carrying the primary provider's API key.
pub const IPAPI_CREDENTIAL_PARAM: &str = "key";

/// Alternate provider base URL.
pub const IPINFO_BASE_URL: &str = "https://ipinfo.io";

/// Query parameter carrying the alternate provider's access token.
pub const IPINFO_CREDENTIAL_PARAM: &str = "token";

/// Default upstream request timeout.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Status used when the provider gives none (transport failures).
pub const UPSTREAM_FALLBACK_STATUS: u16 = 500;

/// Status used for in-band provider errors delivered with a 2xx response.
pub const UPSTREAM_INBAND_ERROR_STATUS: u16 = 400;

/// Error label on failed lookups.
pub const UPSTREAM_ERROR_LABEL: &str = "Failed to fetch IP details";
