use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::FetchError;

/// Source of the full list of tradable instruments.
#[async_trait]
pub trait InstrumentSource: Send + Sync {
    /// Returns the raw list entries as delivered by the remote.
    async fn fetch_instruments(&self) -> Result<Vec<Value>, FetchError>;
}
