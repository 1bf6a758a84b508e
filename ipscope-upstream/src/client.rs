//! Geolocation provider client.
//!
//! One HTTP client serves both providers; the provider profile picked per
//! call decides the URL, the credential parameter and the response mapping.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use ipscope_core::error::{IpscopeError, Result};
use ipscope_core::traits::GeoLookup;
use ipscope_core::types::{Provider, ResultRecord};

use crate::config::UpstreamConfig;
use crate::profile::{error_message, ProviderProfile};

/// Client for the upstream geolocation providers.
pub struct GeoClient {
    config: UpstreamConfig,
    http_client: reqwest::Client,
    ipapi_base: Url,
    ipinfo_base: Url,
}

impl GeoClient {
    /// Creates a client with default configuration (public endpoints, no credentials).
    pub fn new() -> Result<Self> {
        Self::with_config(UpstreamConfig::default())
    }

    /// Creates a client with custom configuration.
    ///
    /// Fails if a provider base URL is not an absolute http(s) URL.
    pub fn with_config(config: UpstreamConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| IpscopeError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let ipapi_base = parse_base_url(&config.ipapi.base_url)?;
        let ipinfo_base = parse_base_url(&config.ipinfo.base_url)?;

        Ok(Self {
            config,
            http_client,
            ipapi_base,
            ipinfo_base,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn base_url(&self, provider: Provider) -> &Url {
        match provider {
            Provider::IpApi => &self.ipapi_base,
            Provider::IpInfo => &self.ipinfo_base,
        }
    }

    /// Looks up `address` (or the caller's own address) at one provider.
    ///
    /// Single attempt. Failures come back as [`IpscopeError::Upstream`]
    /// with the provider's status and message when it gave them.
    #[instrument(skip(self))]
    pub async fn lookup(&self, address: Option<&str>, provider: Provider) -> Result<ResultRecord> {
        let profile = ProviderProfile::for_provider(provider);
        let url = profile.endpoint(self.base_url(provider), address)?;

        let mut request = self.http_client.get(url.clone());
        if let Some(credential) = self.config.provider(provider).credential() {
            request = request.query(&[(profile.credential_param, credential)]);
        }

        debug!(%url, "Querying provider");

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Provider request failed");
            IpscopeError::transport(e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, status = status.as_u16(), "Failed to read provider response");
            IpscopeError::transport(e.to_string())
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&body)
                .ok()
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            warn!(status = status.as_u16(), reason = %message, "Provider returned an error");
            return Err(IpscopeError::upstream(status.as_u16(), message));
        }

        let json: Value = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "Provider returned malformed JSON");
            IpscopeError::transport(format!("Invalid provider response: {}", e))
        })?;

        let record = profile
            .normalize(json)
            .inspect_err(|e| warn!(error = %e, "Provider reported a failure"))?;

        info!(ip = record.ip.as_deref().unwrap_or("-"), "Fetched IP details");
        Ok(record)
    }
}

#[async_trait]
impl GeoLookup for GeoClient {
    async fn fetch(&self, address: Option<&str>, provider: Provider) -> Result<ResultRecord> {
        self.lookup(address, provider).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| IpscopeError::ConfigError(format!("Invalid provider URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(IpscopeError::ConfigError(format!(
            "Provider URL must be an absolute http(s) URL: {}",
            raw
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, ipapi_key: &str, ipinfo_token: &str) -> GeoClient {
        let config = UpstreamConfig {
            ipapi: ProviderConfig::new(server.uri()).with_credential(ipapi_key),
            ipinfo: ProviderConfig::new(server.uri()).with_credential(ipinfo_token),
            timeout_seconds: 5,
            ..Default::default()
        };
        GeoClient::with_config(config).unwrap()
    }

    async fn assert_no_query(server: &MockServer) {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_ipapi_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/8.8.8.8/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "8.8.8.8",
                "city": "Mountain View",
                "region": "California",
                "country": "US",
                "country_name": "United States",
                "latitude": 37.4056,
                "longitude": -122.0775,
                "timezone": "America/Los_Angeles",
                "currency": "USD",
                "org": "GOOGLE",
                "asn": "AS15169"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let record = client.lookup(Some("8.8.8.8"), Provider::IpApi).await.unwrap();

        assert_eq!(record.ip.as_deref(), Some("8.8.8.8"));
        assert_eq!(record.country_name.as_deref(), Some("United States"));
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert_eq!(record.coordinates(), Some((37.4056, -122.0775)));
    }

    #[tokio::test]
    async fn test_own_address_uses_bare_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "203.0.113.7",
                "loc": "51.5074,-0.1278"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let record = client.fetch(None, Provider::IpInfo).await.unwrap();

        assert_eq!(record.ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(record.coordinates(), Some((51.5074, -0.1278)));
    }

    #[tokio::test]
    async fn test_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "1.1.1.1" })))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        client.lookup(Some("1.1.1.1"), Provider::IpApi).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let agent = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
        assert!(agent.starts_with("ipscope/"));
    }

    #[tokio::test]
    async fn test_credentials_attached_per_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1.1.1/json/"))
            .and(query_param("key", "k-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "1.1.1.1" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1.1.1.1/json"))
            .and(query_param("token", "t-456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "1.1.1.1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "k-123", "t-456");
        client.lookup(Some("1.1.1.1"), Provider::IpApi).await.unwrap();
        client.lookup(Some("1.1.1.1"), Provider::IpInfo).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_credential_sends_no_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "8.8.8.8" })))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "   ");
        client.lookup(Some("8.8.8.8"), Provider::IpInfo).await.unwrap();

        assert_no_query(&server).await;
    }

    #[tokio::test]
    async fn test_error_status_and_message_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invalid-ip/json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": 404,
                "error": { "title": "Wrong ip", "message": "Please provide a valid IP address" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let err = client.lookup(Some("invalid-ip"), Provider::IpInfo).await.unwrap_err();

        match err {
            IpscopeError::Upstream { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Please provide a valid IP address");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let err = client.lookup(Some("8.8.8.8"), Provider::IpApi).await.unwrap_err();

        match err {
            IpscopeError::Upstream { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Request failed with status code 429");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inband_error_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/0.0.0.0/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "0.0.0.0",
                "error": true,
                "reason": "Reserved IP Address"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let err = client.lookup(Some("0.0.0.0"), Provider::IpApi).await.unwrap_err();
        assert!(matches!(err, IpscopeError::Upstream { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let err = client.lookup(Some("8.8.8.8"), Provider::IpApi).await.unwrap_err();
        assert!(matches!(err, IpscopeError::Upstream { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_server_error() {
        let config = UpstreamConfig {
            ipapi: ProviderConfig::new("http://127.0.0.1:1"),
            timeout_seconds: 2,
            ..Default::default()
        };
        let client = GeoClient::with_config(config).unwrap();

        let err = client.lookup(Some("8.8.8.8"), Provider::IpApi).await.unwrap_err();
        match err {
            IpscopeError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = UpstreamConfig {
            ipinfo: ProviderConfig::new("not a url"),
            ..Default::default()
        };
        assert!(matches!(
            GeoClient::with_config(config),
            Err(IpscopeError::ConfigError(_))
        ));

        let config = UpstreamConfig {
            ipapi: ProviderConfig::new("mailto:geo@example.com"),
            ..Default::default()
        };
        assert!(GeoClient::with_config(config).is_err());
    }
}
