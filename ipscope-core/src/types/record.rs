//! Normalized lookup results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geolocation and ownership metadata for one address.
///
/// Every field is optional because providers may omit any of them. Fields a
/// provider returns outside the normalized set are preserved in `extra` and
/// serialized inline, so the JSON form mirrors the provider payload.
///
/// A record is an immutable snapshot of provider output at fetch time; the
/// cache shares it behind an `Arc` and only ever replaces it wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Address the record describes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// City name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Region / state name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Region / state code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Country display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    /// Postal code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal: Option<String>,
    /// Latitude in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// IANA timezone name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Owning organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    /// Autonomous system number, e.g. `AS15169`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
    /// ISO 4217 currency code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Reverse DNS name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Provider fields outside the normalized set
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultRecord {
    /// Returns `(latitude, longitude)` when both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
