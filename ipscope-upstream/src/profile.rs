//! Provider profiles: endpoint layout, credential parameter, response mapping.

use serde_json::Value;
use url::Url;

use ipscope_core::constants::{
    IPAPI_CREDENTIAL_PARAM, IPINFO_CREDENTIAL_PARAM, UPSTREAM_INBAND_ERROR_STATUS,
};
use ipscope_core::error::{IpscopeError, Result};
use ipscope_core::types::{Provider, ResultRecord};

/// Everything that differs between providers.
pub(crate) struct ProviderProfile {
    /// Query parameter name for the credential
    pub credential_param: &'static str,
    /// Whether the endpoint path ends in `json/` rather than `json`
    trailing_slash: bool,
    /// Maps a successful response body into a record
    normalize: fn(Value) -> Result<ResultRecord>,
}

static IPAPI: ProviderProfile = ProviderProfile {
    credential_param: IPAPI_CREDENTIAL_PARAM,
    trailing_slash: true,
    normalize: normalize_ipapi,
};

static IPINFO: ProviderProfile = ProviderProfile {
    credential_param: IPINFO_CREDENTIAL_PARAM,
    trailing_slash: false,
    normalize: normalize_ipinfo,
};

impl ProviderProfile {
    /// Returns the profile for a provider.
    pub fn for_provider(provider: Provider) -> &'static ProviderProfile {
        match provider {
            Provider::IpApi => &IPAPI,
            Provider::IpInfo => &IPINFO,
        }
    }

    /// Builds the lookup URL: `{base}/{address}/json` or `{base}/json`.
    ///
    /// The address is percent-encoded as a single path segment.
    pub fn endpoint(&self, base: &Url, address: Option<&str>) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                IpscopeError::ConfigError(format!("Provider URL cannot be a base: {}", base))
            })?;
            segments.pop_if_empty();
            if let Some(addr) = address {
                segments.push(addr);
            }
            segments.push("json");
            if self.trailing_slash {
                segments.push("");
            }
        }
        Ok(url)
    }

    /// Maps a 2xx response body into a record.
    pub fn normalize(&self, body: Value) -> Result<ResultRecord> {
        (self.normalize)(body)
    }
}

/// ipapi.co already uses the normalized field names, but reports some
/// failures in-band as `{"error": true, "reason": ...}` with a 200.
fn normalize_ipapi(body: Value) -> Result<ResultRecord> {
    if body.get("error").and_then(Value::as_bool) == Some(true) {
        let message = error_message(&body).unwrap_or_else(|| "Unknown provider error".into());
        return Err(IpscopeError::upstream(UPSTREAM_INBAND_ERROR_STATUS, message));
    }
    decode(body)
}

/// ipinfo.io packs coordinates into `loc` ("lat,lng") and prefixes `org`
/// with the AS number.
fn normalize_ipinfo(body: Value) -> Result<ResultRecord> {
    let mut record = decode(body)?;

    if let Some(Value::String(loc)) = record.extra.remove("loc") {
        if let Some((lat, lng)) = parse_loc(&loc) {
            record.latitude = Some(lat);
            record.longitude = Some(lng);
        } else {
            record.extra.insert("loc".into(), Value::String(loc));
        }
    }

    if record.asn.is_none() {
        record.asn = record.org.as_deref().and_then(parse_asn);
    }

    Ok(record)
}

fn decode(body: Value) -> Result<ResultRecord> {
    serde_json::from_value(body)
        .map_err(|e| IpscopeError::transport(format!("Invalid provider response: {}", e)))
}

fn parse_loc(loc: &str) -> Option<(f64, f64)> {
    let (lat, lng) = loc.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

fn parse_asn(org: &str) -> Option<String> {
    let (asn, _) = org.split_once(' ')?;
    let digits = asn.strip_prefix("AS")?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(asn.to_string())
    } else {
        None
    }
}

/// Extracts a human-readable message from a provider error body.
///
/// Understands `{"message": ..}`, `{"error": {"message": ..}}`,
/// `{"reason": ..}` and `{"error": ".."}`.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(|e| e.get("message")).and_then(Value::as_str))
        .or_else(|| body.get("reason").and_then(Value::as_str))
        .or_else(|| body.get("error").and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
