//! Serializable batch configuration.
//!
//! Loaded from a TOML file with two optional tables:
//!
//! ```toml
//! [batch]
//! hours_ago = 48
//! resolution = "15"
//! window_size = 8
//! max_concurrency = 4
//! category = "spot"
//!
//! [provider]
//! base_url = "https://api.bybit.com"
//! request_timeout_secs = 10
//! ```
//!
//! Missing keys fall back to the defaults above.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vollab_core::data::BybitConfig;
use vollab_core::domain::{MarketCategory, Resolution, WindowSize};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parameters of one batch run. Everything the per-symbol pipeline needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Lookback window in hours, ending at fetch time.
    pub hours_ago: u32,

    /// Candle granularity.
    pub resolution: Resolution,

    /// Returns per rolling std-dev window.
    pub window_size: WindowSize,

    /// Upper bound on symbols fetched at the same time.
    pub max_concurrency: usize,

    /// Market segment queried at the provider.
    pub category: MarketCategory,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            hours_ago: 48,
            resolution: Resolution::Min15,
            window_size: WindowSize::DEFAULT,
            max_concurrency: 4,
            category: MarketCategory::Spot,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hours_ago == 0 {
            return Err(ConfigError::Invalid("hours_ago must be >= 1".into()));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid("max_concurrency must be >= 1".into()));
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hash of the parameters that shape the output.
    ///
    /// Concurrency is left out: it changes scheduling, never results.
    pub fn fingerprint(&self) -> String {
        let canonical = format!(
            "hours_ago={};resolution={};window_size={};category={}",
            self.hours_ago, self.resolution, self.window_size, self.category
        );
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}

/// Full configuration file: batch parameters plus provider connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolConfig {
    pub batch: BatchConfig,
    pub provider: BybitConfig,
}

impl VolConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.batch.validate()?;
        if self.provider.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.request_timeout_secs must be >= 1".into(),
            ));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.base_url is empty".into()));
        }
        Ok(())
    }
}
