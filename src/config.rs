use axum::http::HeaderValue;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::room::{CleanupConfig, RegistryLimits};

/// Application configuration, read from `CODESPACE_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Single allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,

    #[serde(default = "default_room_capacity")]
    pub room_capacity: usize,

    #[serde(default = "default_max_content_len")]
    pub max_content_len: usize,

    #[serde(default = "default_min_credential_len")]
    pub min_credential_len: usize,

    /// Length of generated room ids and passcodes
    #[serde(default = "default_token_len")]
    pub token_len: usize,

    #[serde(default = "default_unclaimed_room_ttl_secs")]
    pub unclaimed_room_ttl_secs: u64,

    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl Config {
    /// Load configuration from the environment, honouring an optional `.env` file
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = match envy::prefixed("CODESPACE_").from_env::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "Failed to load configuration");
                return Err(ConfigError::Env(e));
            }
        };
        config.validate()?;

        info!(address = %config.server_address(), "Configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.allowed_origin()?;
        if self.room_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "room_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.token_len < self.min_credential_len {
            return Err(ConfigError::Invalid {
                field: "token_len",
                reason: format!(
                    "generated tokens ({}) would fail the minimum credential length ({})",
                    self.token_len, self.min_credential_len
                ),
            });
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "cleanup_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The single CORS origin to allow, or `None` to allow any origin.
    /// A configured value must be an absolute `http(s)` origin that is a valid header.
    pub fn allowed_origin(&self) -> Result<Option<HeaderValue>, ConfigError> {
        let Some(origin) = self.cors_origin.as_deref() else {
            return Ok(None);
        };

        let invalid = |reason: String| ConfigError::Invalid {
            field: "cors_origin",
            reason,
        };

        if !origin.is_ascii() || !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(invalid(format!("{origin:?} is not an http(s) origin")));
        }
        origin
            .parse::<HeaderValue>()
            .map(Some)
            .map_err(|e| invalid(format!("{origin:?}: {e}")))
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn registry_limits(&self) -> RegistryLimits {
        RegistryLimits {
            room_capacity: self.room_capacity,
            max_content_len: self.max_content_len,
            min_credential_len: self.min_credential_len,
        }
    }

    pub fn cleanup_config(&self) -> CleanupConfig {
        CleanupConfig {
            cleanup_interval: Duration::from_secs(self.cleanup_interval_secs),
            unclaimed_room_ttl: Duration::from_secs(self.unclaimed_room_ttl_secs),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_room_capacity() -> usize {
    10
}

fn default_max_content_len() -> usize {
    100_000
}

fn default_min_credential_len() -> usize {
    4
}

fn default_token_len() -> usize {
    6
}

fn default_unclaimed_room_ttl_secs() -> u64 {
    600
}

fn default_cleanup_interval_secs() -> u64 {
    60
}
