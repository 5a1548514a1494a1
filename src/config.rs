//! Configuration management for Drive Fetcher
//!
//! Unified configuration with zero-config defaults: a missing file silently
//! yields the built-in settings, a present-but-invalid file is an error. The
//! default location is `<config_dir>/drive_fetcher/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::{ClientConfig, CoordinatorConfig};
use crate::constants::{http, limits};
use crate::errors::{ConfigError, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Batch orchestration settings
    pub coordinator: CoordinatorConfigToml,
    /// Delivery output settings
    pub output: OutputConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// User agent header value
    pub user_agent: String,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            max_redirects: http::MAX_REDIRECTS,
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

/// TOML-friendly orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfigToml {
    /// Pause between consecutive task attempts (e.g. "1500ms", "2s")
    #[serde(with = "humantime_serde")]
    pub pacing: Duration,
}

impl Default for CoordinatorConfigToml {
    fn default() -> Self {
        Self {
            pacing: limits::PACING_DELAY,
        }
    }
}

/// Delivery output settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfigToml {
    /// Directory renamed deliveries are written to; defaults to `./downloads`
    pub directory: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when no CLI verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, or from the default
    /// location when none is given. An absent default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    }
                    .into());
                }
                Self::from_file(path)
            }
            None => {
                let default_path = Self::default_path();
                match default_path {
                    Some(path) if path.exists() => Self::from_file(&path),
                    _ => {
                        debug!("No configuration file found, using defaults");
                        Ok(Self::default())
                    }
                }
            }
        }
    }

    /// Default configuration file location, if the platform exposes one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("drive_fetcher").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "rate limit must be non-zero".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Runtime client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.client.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.client.connect_timeout_secs),
            max_redirects: self.client.max_redirects,
            rate_limit_rps: self.client.rate_limit_rps,
            user_agent: self.client.user_agent.clone(),
        }
    }

    /// Runtime orchestrator configuration
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            pacing: self.coordinator.pacing,
        }
    }

    /// Directory renamed deliveries land in
    pub fn output_directory(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("downloads"))
    }
}
