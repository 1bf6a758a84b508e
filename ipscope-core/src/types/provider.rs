//! Upstream provider selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upstream geolocation provider.
///
/// Each request is served end-to-end by exactly one provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// ipapi.co, the primary provider
    IpApi,
    /// ipinfo.io, the alternate provider
    IpInfo,
}

impl Provider {
    /// Provider used by the primary lookup routes.
    pub const PRIMARY: Provider = Provider::IpApi;

    /// Provider used by the alternate lookup routes.
    pub const ALTERNATE: Provider = Provider::IpInfo;

    /// Short stable name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::IpApi => "ipapi",
            Provider::IpInfo => "ipinfo",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
