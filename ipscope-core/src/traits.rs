//! Common traits for ipscope.
//!
//! The orchestrator talks to upstream providers only through [`GeoLookup`],
//! so tests can substitute a scripted provider.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Provider, ResultRecord};

/// Interface for fetching geolocation metadata from an upstream provider.
///
/// Implementations perform a single attempt per call; retrying is the
/// caller's decision.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Fetches the record for `address`, or for the caller's own address
    /// when `address` is `None`, from the given provider.
    ///
    /// Failures are reported as [`IpscopeError::Upstream`](crate::IpscopeError::Upstream).
    async fn fetch(&self, address: Option<&str>, provider: Provider) -> Result<ResultRecord>;
}
