//! Runtime configuration.
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual keys. The loaded value is shared behind a lock so that
//! services read the current value on each call instead of caching it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default message lifetime: 30 days.
pub const DEFAULT_MESSAGE_TTL: u64 = 2_592_000;
/// Default cap on list page size.
pub const DEFAULT_MAX_LIMIT: usize = 1000;
/// Default interval between expired-message sweeps: one day.
pub const DEFAULT_REAP_INTERVAL: u64 = 86_400;

/// Environment variable names.
pub mod env_vars {
    pub const MESSAGE_TTL: &str = "STRATUS_MESSAGE_TTL";
    pub const MAX_LIMIT: &str = "STRATUS_MAX_LIMIT";
    pub const REAP_INTERVAL: &str = "STRATUS_MESSAGE_REAP_INTERVAL";
    pub const PUBLIC_ENDPOINT: &str = "STRATUS_PUBLIC_ENDPOINT";
    pub const DATA_DIR: &str = "STRATUS_DATA_DIR";
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StratusConfig {
    /// Seconds a user message lives before it becomes eligible for cleanup.
    pub message_ttl: u64,
    /// Maximum number of items a list request may return.
    pub osapi_max_limit: usize,
    /// Seconds between expired-message sweeps.
    pub message_reap_interval: u64,
    /// Base URL used in generated links, e.g. `https://volume.example.com/v3`.
    pub public_endpoint: Option<String>,
    /// Directory for the persistent message database. In-memory when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for StratusConfig {
    fn default() -> Self {
        Self {
            message_ttl: DEFAULT_MESSAGE_TTL,
            osapi_max_limit: DEFAULT_MAX_LIMIT,
            message_reap_interval: DEFAULT_REAP_INTERVAL,
            public_endpoint: None,
            data_dir: None,
        }
    }
}

impl StratusConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::debug!("Loaded config from {}", path.display());
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(env_vars::MESSAGE_TTL) {
            self.message_ttl = parse_value(env_vars::MESSAGE_TTL, &v)?;
        }
        if let Some(v) = lookup(env_vars::MAX_LIMIT) {
            self.osapi_max_limit = parse_value(env_vars::MAX_LIMIT, &v)?;
        }
        if let Some(v) = lookup(env_vars::REAP_INTERVAL) {
            self.message_reap_interval = parse_value(env_vars::REAP_INTERVAL, &v)?;
        }
        if let Some(v) = lookup(env_vars::PUBLIC_ENDPOINT) {
            self.public_endpoint = Some(v.trim_end_matches('/').to_string());
        }
        if let Some(v) = lookup(env_vars::DATA_DIR) {
            self.data_dir = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Message lifetime as a duration, saturating at the largest representable value.
    pub fn message_ttl(&self) -> chrono::Duration {
        i64::try_from(self.message_ttl)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Wrap into a shared handle.
    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

/// Configuration handle shared between services.
pub type SharedConfig = Arc<RwLock<StratusConfig>>;

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
