//! Error types for ipscope.
//!
//! One error hierarchy built with `thiserror`. Cache and rate-limiter
//! operations are infallible and never produce these; they come from the
//! upstream client, the orchestrator's admission check, configuration and
//! the listening socket.

use std::time::Duration;

use thiserror::Error;

use crate::constants::UPSTREAM_FALLBACK_STATUS;

/// Result type alias using `IpscopeError`.
pub type Result<T> = std::result::Result<T, IpscopeError>;

/// Main error type for all ipscope operations.
#[derive(Debug, Error)]
pub enum IpscopeError {
    // ═══════════════════════════════════════════════════════════════════════════
    // ADMISSION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Caller exceeded its request quota for the current window.
    #[error("Rate limit exceeded for '{identity}', retry in {}s", .retry_after.as_secs())]
    Throttled {
        /// Identity that was rejected
        identity: String,
        /// Configured quota per window
        limit: u32,
        /// Time until the caller's window resets
        retry_after: Duration,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Provider unreachable, timed out, or answered with a failure.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status from the provider, or a generic server error
        status: u16,
        /// Provider message, or the transport error text
        message: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & SERVER
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Listener bind or serve failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IpscopeError {
    /// Builds an upstream error from a provider status and message.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        IpscopeError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Builds an upstream error for a failure with no provider status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::upstream(UPSTREAM_FALLBACK_STATUS, message)
    }

    /// Returns true if this is an admission (rate limit) rejection.
    pub fn is_throttle(&self) -> bool {
        matches!(self, IpscopeError::Throttled { .. })
    }
}
