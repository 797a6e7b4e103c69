//! File and environment configuration.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use convo_api::{normalize_base_url, ChatApiConfig, ChatApiError};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV_VAR: &str = "CONVO_CONFIG_PATH";
pub const ENDPOINT_ENV_VAR: &str = "CONVO_ENDPOINT";
pub const SUBSCRIPTION_KEY_ENV_VAR: &str = "CONVO_SUBSCRIPTION_KEY";
pub const TIME_ZONE_ENV_VAR: &str = "CONVO_TIME_ZONE";
pub const TIMEOUT_ENV_VAR: &str = "CONVO_TIMEOUT_SEC";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("timeout_sec must be a positive integer, got '{0}'")]
    InvalidTimeout(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] ChatApiError),
}

/// Shape of the optional JSON file named by `CONVO_CONFIG_PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub subscription_key: Option<String>,
    pub time_zone: Option<String>,
    pub timeout_sec: Option<u64>,
}

/// Resolved CLI settings. Environment values override the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub endpoint: String,
    pub subscription_key: Option<String>,
    pub time_zone: Option<String>,
    pub timeout: Option<Duration>,
}

impl CliConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let file = match env_string_opt(CONFIG_PATH_ENV_VAR) {
            Some(path) => read_file_config(Path::new(&path))?,
            None => FileConfig::default(),
        };
        Self::from_file_and_env(file)
    }

    pub fn from_file_and_env(file: FileConfig) -> Result<Self, ConfigError> {
        let endpoint = env_string_opt(ENDPOINT_ENV_VAR)
            .or(file.endpoint)
            .unwrap_or_default();

        let timeout_sec = match env_string_opt(TIMEOUT_ENV_VAR) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => file.timeout_sec,
        };
        let timeout = match timeout_sec {
            Some(0) => return Err(ConfigError::InvalidTimeout("0".to_string())),
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => None,
        };

        Ok(Self {
            endpoint: normalize_base_url(&endpoint)?,
            subscription_key: env_string_opt(SUBSCRIPTION_KEY_ENV_VAR)
                .or(file.subscription_key)
                .filter(|value| !value.trim().is_empty()),
            time_zone: env_string_opt(TIME_ZONE_ENV_VAR)
                .or(file.time_zone)
                .filter(|value| !value.trim().is_empty()),
            timeout,
        })
    }

    pub fn api_config(&self) -> ChatApiConfig {
        let mut config = ChatApiConfig::new(self.endpoint.clone());
        if let Some(key) = &self.subscription_key {
            config = config.with_subscription_key(key.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}

pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
