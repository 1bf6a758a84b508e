//! Upstream client configuration.

use serde::{Deserialize, Serialize};

use ipscope_core::constants::{DEFAULT_UPSTREAM_TIMEOUT_SECS, IPAPI_BASE_URL, IPINFO_BASE_URL};
use ipscope_core::types::Provider;

/// Endpoint and optional credential for one provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider base URL (scheme and host, optionally a path prefix)
    pub base_url: String,
    /// API key or token; never sent when absent or blank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl ProviderConfig {
    /// Creates an unauthenticated provider configuration.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: None,
        }
    }

    /// Sets the credential. Blank values leave the provider unauthenticated.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        let credential = credential.into();
        self.credential = if credential.trim().is_empty() {
            None
        } else {
            Some(credential)
        };
        self
    }

    /// Returns the credential to send, if any.
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Upstream client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Primary provider (ipapi.co)
    pub ipapi: ProviderConfig,
    /// Alternate provider (ipinfo.io)
    pub ipinfo: ProviderConfig,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            ipapi: ProviderConfig::new(IPAPI_BASE_URL),
            ipinfo: ProviderConfig::new(IPINFO_BASE_URL),
            timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            user_agent: format!("ipscope/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl UpstreamConfig {
    /// Sets the primary provider's API key.
    pub fn with_ipapi_key(mut self, key: impl Into<String>) -> Self {
        self.ipapi = self.ipapi.with_credential(key);
        self
    }

    /// Sets the alternate provider's access token.
    pub fn with_ipinfo_token(mut self, token: impl Into<String>) -> Self {
        self.ipinfo = self.ipinfo.with_credential(token);
        self
    }

    /// Returns the configuration for a provider.
    pub fn provider(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::IpApi => &self.ipapi,
            Provider::IpInfo => &self.ipinfo,
        }
    }
}
