//! DTOs for API responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ipscope_cache::CacheStats;

/// Plain `{"message": ..}` response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since startup
    pub uptime_seconds: u64,
    /// Startup time
    pub started_at: DateTime<Utc>,
    /// Result cache statistics
    pub cache: CacheStats,
    /// Identities with a live rate-limit window
    pub rate_limited_identities: usize,
}
