//! Client configuration
//!
//! Resolution order, later steps winning: built-in defaults, an optional TOML
//! file, then `CHURN_*` environment variables. The CLI may override the
//! service address last.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Service address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_PATH: &str = "config/churn.toml";

pub const ENV_API_URL: &str = "CHURN_API_URL";
pub const ENV_CONFIG: &str = "CHURN_CONFIG";
pub const ENV_TIMEOUT_SECONDS: &str = "CHURN_TIMEOUT_SECONDS";
pub const ENV_HISTORY_LIMIT: &str = "CHURN_HISTORY_LIMIT";

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the prediction service; `/predict` is appended
    pub api_url: String,
    /// Request timeout. `None` leaves it to the network stack.
    pub timeout_seconds: Option<u64>,
    /// History cap. `None` keeps every entry for the session.
    pub history_limit: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: None,
            history_limit: None,
        }
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
}

/// Loads and holds the client configuration
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ClientConfig,
    source: ConfigSource,
}

impl ConfigManager {
    /// Load with an explicit config file. A missing explicit file is an error;
    /// a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.map(Path::to_path_buf).or_else(|| {
            env::var(ENV_CONFIG)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        });

        let (mut config, source) = match explicit {
            Some(path) => (Self::load_config_from_file(&path)?, ConfigSource::File(path)),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                (Self::load_config_from_file(&path)?, ConfigSource::File(path))
            }
            None => (ClientConfig::default(), ConfigSource::Defaults),
        };

        Self::apply_env_overrides(&mut config, |key| env::var(key).ok());
        debug!(?source, api_url = %config.api_url, "configuration loaded");

        Ok(Self { config, source })
    }

    /// Wrap an already resolved configuration
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            source: ConfigSource::Defaults,
        }
    }

    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn into_config(self) -> ClientConfig {
        self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Override the service address, ignoring blank input
    pub fn override_api_url(&mut self, api_url: &str) {
        let trimmed = api_url.trim();
        if !trimmed.is_empty() {
            self.config.api_url = trimmed.to_string();
        }
    }

    fn load_config_from_file(path: &Path) -> Result<ClientConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::parse_config(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn parse_config(content: &str) -> Result<ClientConfig, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.into())
    }

    fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_API_URL) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                config.api_url = trimmed.to_string();
            }
        }

        if let Some(value) = lookup(ENV_TIMEOUT_SECONDS) {
            if let Some(parsed) = Self::parse_number::<u64>(ENV_TIMEOUT_SECONDS, &value) {
                config.timeout_seconds = Some(parsed);
            }
        }

        if let Some(value) = lookup(ENV_HISTORY_LIMIT) {
            if let Some(parsed) = Self::parse_number::<usize>(ENV_HISTORY_LIMIT, &value) {
                config.history_limit = Some(parsed);
            }
        }
    }

    fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!("Ignoring {key}={trimmed}: not a valid number");
                None
            }
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    service: ServiceSection,
    session: SessionSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ServiceSection {
    api_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SessionSection {
    history_limit: Option<usize>,
}

impl From<ConfigFile> for ClientConfig {
    fn from(file: ConfigFile) -> Self {
        let defaults = ClientConfig::default();
        ClientConfig {
            api_url: file
                .service
                .api_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.api_url),
            timeout_seconds: file.service.timeout_seconds,
            history_limit: file.session.history_limit,
        }
    }
}
