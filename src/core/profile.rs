//! Company profile abstractions

use crate::core::error::FetchError;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Profile fields merged into an instrument record.
///
/// Every field must be present in the response, but the remote may report any of them
/// as `null` (ETFs usually carry no sector or industry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(deserialize_with = "present")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "present")]
    pub industry: Option<String>,
    #[serde(deserialize_with = "present")]
    pub sector: Option<String>,
    #[serde(deserialize_with = "present")]
    pub country: Option<String>,
    #[serde(deserialize_with = "present")]
    pub image: Option<String>,
    #[serde(deserialize_with = "present")]
    pub description: Option<String>,
}

// A field using `deserialize_with` has no implicit default, so absence is an error
// while an explicit null still maps to None.
fn present<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl CompanyProfile {
    pub const FIELDS: [&'static str; 6] = [
        "currency",
        "industry",
        "sector",
        "country",
        "image",
        "description",
    ];

    /// Field name and value pairs in merge order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("currency", self.currency.as_deref()),
            ("industry", self.industry.as_deref()),
            ("sector", self.sector.as_deref()),
            ("country", self.country.as_deref()),
            ("image", self.image.as_deref()),
            ("description", self.description.as_deref()),
        ]
    }
}

#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Fetches the profile for `symbol`. `Ok(None)` means the remote answered but had
    /// no profile for it.
    async fn fetch_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>, FetchError>;
}
