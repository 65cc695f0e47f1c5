//! Description rewriting abstractions

use crate::core::error::{ConfigError, FetchError};
use async_trait::async_trait;
use std::fmt::Display;
use std::str::FromStr;

/// The text rewriting service used for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteBackend {
    /// Chat style bot API.
    Coze,
    /// Completion style API.
    OpenAi,
}

impl Display for RewriteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RewriteBackend::Coze => "coze",
                RewriteBackend::OpenAi => "openai",
            }
        )
    }
}

impl FromStr for RewriteBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coze" => Ok(RewriteBackend::Coze),
            "openai" => Ok(RewriteBackend::OpenAi),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

#[async_trait]
pub trait DescriptionRewriter: Send + Sync {
    /// Returns the rewritten form of `text`, or why the call produced nothing usable.
    async fn rewrite(&self, text: &str) -> Result<String, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("coze".parse::<RewriteBackend>(), Ok(RewriteBackend::Coze));
        assert_eq!("Coze".parse::<RewriteBackend>(), Ok(RewriteBackend::Coze));
        assert_eq!(" OPENAI ".parse::<RewriteBackend>(), Ok(RewriteBackend::OpenAi));
        assert_eq!(
            "".parse::<RewriteBackend>(),
            Err(ConfigError::InvalidBackend(String::new()))
        );
        assert!("gpt".parse::<RewriteBackend>().is_err());
    }

    #[test]
    fn test_backend_display_round_trips() {
        for backend in [RewriteBackend::Coze, RewriteBackend::OpenAi] {
            assert_eq!(backend.to_string().parse::<RewriteBackend>(), Ok(backend));
        }
    }
}
