use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{API_VERSION, DEFAULT_API_BASE_URL};
use crate::filter::PostFilter;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "VK_ARCHIVER_CONFIG";

/// Environment variable that overrides `access_token` from the file.
pub const ACCESS_TOKEN_ENV: &str = "VK_ACCESS_TOKEN";

const DEFAULT_CONFIG_PATH: &str = "config.json";

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
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

/// Run configuration, loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Wall API
    pub access_token: String,
    pub domain: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // Content policy
    #[serde(default)]
    pub post_filter: PostFilter,

    // Output
    #[serde(default)]
    pub download_attachments: bool,
    /// Number of posts to consider; 0 means the whole wall.
    #[serde(default)]
    pub post_number: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from the file named by `VK_ARCHIVER_CONFIG`
    /// (default `config.json`), applying the `VK_ACCESS_TOKEN` override.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = optional_env(CONFIG_PATH_ENV).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        if let Some(token) = optional_env(ACCESS_TOKEN_ENV) {
            config.access_token = token;
        }
        Ok(config)
    }

    /// Parse configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid configuration document.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "access_token".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.domain.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "domain".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "request_timeout_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// A complete configuration for tests, pointing at no real service.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            access_token: "test-token".to_string(),
            domain: "testwall".to_string(),
            api_base_url: "http://127.0.0.1:9/method".to_string(),
            api_version: default_api_version(),
            request_timeout_secs: 10,
            post_filter: PostFilter::default(),
            download_attachments: false,
            post_number: 0,
            output_dir: default_output_dir(),
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
