//! Configuration loading for the Larder CLI.
//!
//! Every field has a default, so running without a file works. A file only
//! needs the keys it overrides; unknown keys are rejected.

use std::path::{Path, PathBuf};
use std::time::Duration;

use larder_source::MEALDB_BASE_URL;
use larder_storage::CacheConfig;
use serde::Deserialize;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LarderConfig {
    /// Directory holding cache records and library files.
    pub data_dir: PathBuf,
    pub api_base_url: String,
    /// Per-request timeout of the HTTP client.
    pub request_timeout_ms: u64,
    /// Upper bound the cache puts on each remote call.
    pub fetch_timeout_ms: u64,
    pub record_ttl_days: u64,
    pub preload_delay_ms: u64,
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub log_filter: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl Default for LarderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".larder"),
            api_base_url: MEALDB_BASE_URL.to_string(),
            request_timeout_ms: 10_000,
            fetch_timeout_ms: 15_000,
            record_ttl_days: 30,
            preload_delay_ms: 100,
            log_filter: "warn,larder_storage=info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl LarderConfig {
    /// Load from `path` when given, defaults otherwise, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data_dir",
                reason: "must not be empty".to_string(),
            });
        }
        let base_url = self.api_base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.record_ttl_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "record_ttl_days",
                reason: "must be > 0".to_string(),
            });
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_filter",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Cache settings derived from this config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_record_ttl(Duration::from_secs(
                self.record_ttl_days.saturating_mul(SECONDS_PER_DAY),
            ))
            .with_fetch_timeout(Duration::from_millis(self.fetch_timeout_ms))
            .with_preload_delay(Duration::from_millis(self.preload_delay_ms))
    }
}
