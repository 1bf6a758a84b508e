//! Lookup orchestration: admission, cache, upstream, cache populate.

use std::sync::Arc;

use tracing::{debug, info, warn};

use ipscope_cache::ResultCache;
use ipscope_core::error::IpscopeError;
use ipscope_core::traits::GeoLookup;
use ipscope_core::types::{LookupKey, Provider, ResultRecord};
use ipscope_limiter::{RateLimitDecision, RateLimiter};

/// Result of a successful lookup.
#[derive(Clone, Debug)]
pub struct LookupOutcome {
    /// The record served to the caller
    pub record: Arc<ResultRecord>,
    /// Whether the record came from cache
    pub from_cache: bool,
    /// Caller's rate-limit state after this request
    pub rate_limit: RateLimitDecision,
}

/// A failed lookup, with the caller's rate-limit state.
///
/// Admitted requests are counted even when the provider fails, so the
/// decision travels with the error.
#[derive(Debug)]
pub struct LookupFailure {
    /// What went wrong
    pub error: IpscopeError,
    /// Caller's rate-limit state after this request
    pub rate_limit: RateLimitDecision,
}

/// Composes the rate limiter, result cache and upstream client.
///
/// Concurrent misses for the same key may each call upstream; the last
/// write wins.
pub struct LookupService {
    cache: Arc<ResultCache>,
    limiter: Arc<RateLimiter>,
    upstream: Arc<dyn GeoLookup>,
}

impl LookupService {
    /// Creates a service from its components.
    pub fn new(cache: Arc<ResultCache>, limiter: Arc<RateLimiter>, upstream: Arc<dyn GeoLookup>) -> Self {
        Self {
            cache,
            limiter,
            upstream,
        }
    }

    /// Serves a lookup for `identity`.
    ///
    /// 1. derive the key from `address`
    /// 2. admit or reject the caller
    /// 3. return a fresh cached record if there is one
    /// 4. otherwise fetch from `provider`; on failure the cache is untouched
    /// 5. cache the fetched record and return it
    pub async fn lookup(
        &self,
        identity: &str,
        address: Option<&str>,
        provider: Provider,
    ) -> Result<LookupOutcome, LookupFailure> {
        let key = LookupKey::from_address(address);

        let rate_limit = self.limiter.check(identity);
        if !rate_limit.allowed {
            return Err(LookupFailure {
                error: IpscopeError::Throttled {
                    identity: identity.to_string(),
                    limit: rate_limit.limit,
                    retry_after: rate_limit.reset_after,
                },
                rate_limit,
            });
        }

        if let Some(record) = self.cache.get(&key) {
            debug!(%key, "Cache hit");
            return Ok(LookupOutcome {
                record,
                from_cache: true,
                rate_limit,
            });
        }

        debug!(%key, %provider, "Cache miss, querying provider");

        let record = match self.upstream.fetch(key.address(), provider).await {
            Ok(record) => Arc::new(record),
            Err(err) => {
                warn!(%key, %provider, error = %err, "Lookup failed");
                return Err(LookupFailure {
                    error: err,
                    rate_limit,
                });
            }
        };

        self.cache.put(key.clone(), Arc::clone(&record));
        info!(%key, %provider, "Cached lookup result");

        Ok(LookupOutcome {
            record,
            from_cache: false,
            rate_limit,
        })
    }

    /// Flushes every cached record. Not rate limited.
    ///
    /// Returns the number of entries removed.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        info!(removed, "Cache cleared");
        removed
    }

    /// Drops expired cache entries and idle rate-limit windows.
    ///
    /// Returns `(cache entries removed, identities removed)`.
    pub fn sweep(&self) -> (usize, usize) {
        (self.cache.cleanup_expired(), self.limiter.evict_idle())
    }

    /// The result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
