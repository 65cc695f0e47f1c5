use crate::core::error::ConfigError;
use crate::core::rewrite::RewriteBackend;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FmpProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CozeProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAiProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub fmp: Option<FmpProviderConfig>,
    pub coze: Option<CozeProviderConfig>,
    pub openai: Option<OpenAiProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            fmp: Some(FmpProviderConfig {
                base_url: DEFAULT_FMP_URL.to_string(),
            }),
            coze: Some(CozeProviderConfig {
                base_url: DEFAULT_COZE_URL.to_string(),
            }),
            openai: Some(OpenAiProviderConfig {
                base_url: DEFAULT_OPENAI_URL.to_string(),
            }),
        }
    }
}

pub const DEFAULT_FMP_URL: &str = "https://fmpcloud.io";
pub const DEFAULT_COZE_URL: &str = "https://api.coze.com";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

fn default_concurrency() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_list_path() -> String {
    "list.json".to_string()
}

fn default_output_path() -> String {
    "output.csv".to_string()
}

/// Run configuration. Loaded once per command and passed down by reference.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub api_key: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub bot_id: String,
    /// Bearer key for the completion backend. Falls back to `api_key` when unset.
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// Either `coze` or `openai`; see [`AppConfig::rewrite_backend`].
    pub rewrite_api: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Upper bound on in-flight requests per stage.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_list_path")]
    pub list_path: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fmpr", "fmpr")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn rewrite_backend(&self) -> Result<RewriteBackend, ConfigError> {
        self.rewrite_api.parse()
    }

    pub fn openai_api_key(&self) -> &str {
        self.openai_api_key.as_deref().unwrap_or(&self.api_key)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Per request timeout, at least one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn fmp_url(&self) -> &str {
        self.providers
            .fmp
            .as_ref()
            .map_or(DEFAULT_FMP_URL, |p| &p.base_url)
    }

    pub fn coze_url(&self) -> &str {
        self.providers
            .coze
            .as_ref()
            .map_or(DEFAULT_COZE_URL, |p| &p.base_url)
    }

    pub fn openai_url(&self) -> &str {
        self.providers
            .openai
            .as_ref()
            .map_or(DEFAULT_OPENAI_URL, |p| &p.base_url)
    }
}
