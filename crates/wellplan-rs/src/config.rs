//! Application configuration from the environment, `.env`, and a TOML
//! secrets file.
//!
//! Lookup order for the API key: process environment (after `.env` is
//! applied), then `GEMINI_API_KEY` in the secrets file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::GEMINI_API_BASE;
use crate::plan::{ModelListPolicy, PlanProviderConfig};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const API_BASE_VAR: &str = "WELLPLAN_API_BASE";
pub const TIMEOUT_VAR: &str = "WELLPLAN_TIMEOUT_SECS";
pub const CACHE_MODELS_VAR: &str = "WELLPLAN_CACHE_MODELS_SECS";

/// Default location of the secrets file, relative to the working directory.
pub const DEFAULT_SECRETS_PATH: &str = ".wellplan/secrets.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API key missing: set GEMINI_API_KEY in the environment, .env, or {0}")]
    MissingApiKey(PathBuf),
    #[error("read secrets file {path}: {source}")]
    SecretsRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse secrets file {path}: {source}")]
    SecretsParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,
}

/// Resolved settings shared by the CLI and the web server.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base: String,
    /// Per-call bound for list and generate requests.
    pub timeout: Duration,
    pub model_list_policy: ModelListPolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("model_list_policy", &self.model_list_policy)
            .finish()
    }
}

impl AppConfig {
    /// Apply `.env` (if any) and resolve settings from the process
    /// environment and `secrets_path` (default [`DEFAULT_SECRETS_PATH`]).
    pub fn load(secrets_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        let secrets_path = secrets_path.unwrap_or_else(|| Path::new(DEFAULT_SECRETS_PATH));
        Self::from_sources(|key| std::env::var(key).ok(), secrets_path)
    }

    /// Resolve settings from an arbitrary variable lookup and a secrets file.
    ///
    /// A missing secrets file is not an error; an unreadable or malformed
    /// one is.
    pub fn from_sources<F>(lookup: F, secrets_path: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = match non_blank(API_KEY_VAR) {
            Some(key) => key,
            None => read_secrets(secrets_path)?
                .gemini_api_key
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingApiKey(secrets_path.to_path_buf()))?,
        };

        let api_base = non_blank(API_BASE_VAR)
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or_else(|| GEMINI_API_BASE.to_string());

        let timeout = match non_blank(TIMEOUT_VAR) {
            Some(raw) => Duration::from_secs(parse_secs(TIMEOUT_VAR, &raw)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let model_list_policy = match non_blank(CACHE_MODELS_VAR) {
            Some(raw) => ModelListPolicy::CacheFor(Duration::from_secs(parse_secs(
                CACHE_MODELS_VAR,
                &raw,
            )?)),
            None => ModelListPolicy::RefreshEveryCall,
        };

        Ok(Self {
            api_key,
            api_base,
            timeout,
            model_list_policy,
        })
    }

    /// Provider settings derived from this configuration.
    pub fn provider_config(&self) -> PlanProviderConfig {
        PlanProviderConfig::default()
            .with_timeout(Some(self.timeout))
            .with_model_list_policy(self.model_list_policy)
    }
}

fn read_secrets(path: &Path) -> Result<SecretsFile, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SecretsFile::default()),
        Err(source) => {
            return Err(ConfigError::SecretsRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&text).map_err(|source| ConfigError::SecretsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Positive whole seconds.
fn parse_secs(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|&secs| secs > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
        })
}
