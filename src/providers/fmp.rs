use super::http::{HttpExecutor, OutboundRequest};
use crate::core::error::FetchError;
use crate::core::instruments::InstrumentSource;
use crate::core::profile::{CompanyProfile, ProfileProvider};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, instrument};

/// Financial Modeling Prep style API: company profiles and the tradable instrument list.
pub struct FmpProvider {
    base_url: Url,
    api_key: String,
    executor: HttpExecutor,
}

impl FmpProvider {
    pub fn new(base_url: &str, api_key: &str, executor: HttpExecutor) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid FMP base url: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            bail!("Invalid FMP base url: {base_url}");
        }
        Ok(FmpProvider {
            base_url,
            api_key: api_key.to_string(),
            executor,
        })
    }

    /// Appends escaped path segments and the api key to the base url.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut().append_pair("apikey", &self.api_key);
        url.into()
    }

    fn profile_url(&self, symbol: &str) -> String {
        self.endpoint(&["api", "v3", "profile", symbol])
    }

    fn list_url(&self) -> String {
        self.endpoint(&["api", "v3", "available-traded", "list"])
    }
}

#[async_trait]
impl ProfileProvider for FmpProvider {
    #[instrument(name = "FmpProfileFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>, FetchError> {
        let data = self
            .executor
            .execute(OutboundRequest::get(self.profile_url(symbol)))
            .await?;

        let first = match data {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            Value::Array(_) => {
                debug!("Empty profile response");
                return Ok(None);
            }
            other => {
                return Err(FetchError::malformed(format!(
                    "expected a profile array for {symbol}, got {other}"
                )));
            }
        };

        serde_json::from_value(first)
            .map(Some)
            .map_err(|e| FetchError::malformed(format!("profile for {symbol}: {e}")))
    }
}

#[async_trait]
impl InstrumentSource for FmpProvider {
    #[instrument(name = "FmpListFetch", skip(self))]
    async fn fetch_instruments(&self) -> Result<Vec<Value>, FetchError> {
        match self
            .executor
            .execute(OutboundRequest::get(self.list_url()))
            .await?
        {
            Value::Array(items) => {
                debug!(count = items.len(), "Received instrument list");
                Ok(items)
            }
            other => Err(FetchError::malformed(format!(
                "expected an instrument array, got {other}"
            ))),
        }
    }
}
