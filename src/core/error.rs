//! Error taxonomy for the enrichment pipeline.
//!
//! [`FetchError`] covers everything that can go wrong with a single outbound call. These
//! are recoverable: the pipeline logs them and leaves the affected field absent.
//! [`ConfigError`] is fatal and stops a run before any request is issued.

use thiserror::Error;

/// Failure of a single outbound request or of reading its response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure, timeout or an unreadable body.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered with anything other than 200.
    #[error("Request to {url} returned HTTP {status}")]
    NonSuccessStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// A 200 response that does not carry the expected fields.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FetchError::MalformedResponse(message.into())
    }
}

/// Configuration problems detected before the pipeline starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid rewrite_api value `{0}`. It should be either 'openai' or 'coze'")]
    InvalidBackend(String),
}
