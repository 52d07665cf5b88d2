//! Configuration for equity research operations

use crate::error::{ResearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the research pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Directory for cached market snapshots
    pub cache_dir: PathBuf,

    /// Directory where generated reports are written
    pub output_dir: PathBuf,

    /// Path of the JSON stock database used by fuzzy search
    pub database_path: PathBuf,

    /// How long a cached snapshot stays valid
    pub cache_expiry: Duration,

    /// Cache files kept per ticker by cleanup
    pub cache_keep_per_ticker: usize,

    /// Whether fetches consult the disk cache
    pub use_cache: bool,

    /// Maximum number of attempts for upstream calls
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Minimum bars of history before technical analysis runs
    pub min_history_days: usize,

    /// Alpha Vantage API key (optional, enables PEG/FCF/analyst enrichment)
    pub alpha_vantage_api_key: Option<String>,

    /// FRED API key (optional, enables the macro snapshot)
    pub fred_api_key: Option<String>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/cache"),
            output_dir: PathBuf::from("outputs"),
            database_path: PathBuf::from("data/stock_database.json"),
            cache_expiry: Duration::from_secs(6 * 3600), // 6 hours
            cache_keep_per_ticker: 20,
            use_cache: true,
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            min_history_days: 60,
            alpha_vantage_api_key: None,
            fred_api_key: None,
        }
    }
}

impl ResearchConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(ResearchError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.cache_expiry.is_zero() {
            return Err(ResearchError::ConfigError(
                "cache_expiry must be greater than 0".to_string(),
            ));
        }

        if self.cache_keep_per_ticker == 0 {
            return Err(ResearchError::ConfigError(
                "cache_keep_per_ticker must be greater than 0".to_string(),
            ));
        }

        if self.min_history_days < 20 {
            return Err(ResearchError::ConfigError(format!(
                "min_history_days must be at least 20, got {}",
                self.min_history_days
            )));
        }

        Ok(())
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.pow(attempt)
    }
}

/// Builder for ResearchConfig
#[derive(Debug, Default)]
pub struct ResearchConfigBuilder {
    cache_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
    cache_expiry: Option<Duration>,
    cache_keep_per_ticker: Option<usize>,
    use_cache: Option<bool>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    min_history_days: Option<usize>,
    alpha_vantage_api_key: Option<String>,
    fred_api_key: Option<String>,
}

impl ResearchConfigBuilder {
    /// Set the cache directory
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the report output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the stock database path
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set cache expiry
    pub fn cache_expiry(mut self, duration: Duration) -> Self {
        self.cache_expiry = Some(duration);
        self
    }

    /// Set how many cache files cleanup keeps per ticker
    pub fn cache_keep_per_ticker(mut self, keep: usize) -> Self {
        self.cache_keep_per_ticker = Some(keep);
        self
    }

    /// Enable or disable the disk cache
    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = Some(enabled);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the minimum history length used for technicals
    pub fn min_history_days(mut self, days: usize) -> Self {
        self.min_history_days = Some(days);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set FRED API key
    pub fn fred_api_key(mut self, key: impl Into<String>) -> Self {
        self.fred_api_key = Some(key.into());
        self
    }

    /// Load API keys and directory overrides from the environment
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("FRED_API_KEY") {
            self.fred_api_key = Some(key);
        }
        if let Ok(dir) = std::env::var("EQUITY_CACHE_DIR") {
            self.cache_dir = Some(dir.into());
        }
        if let Ok(dir) = std::env::var("EQUITY_OUTPUT_DIR") {
            self.output_dir = Some(dir.into());
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResearchConfig> {
        let defaults = ResearchConfig::default();

        let config = ResearchConfig {
            cache_dir: self.cache_dir.unwrap_or(defaults.cache_dir),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            database_path: self.database_path.unwrap_or(defaults.database_path),
            cache_expiry: self.cache_expiry.unwrap_or(defaults.cache_expiry),
            cache_keep_per_ticker: self
                .cache_keep_per_ticker
                .unwrap_or(defaults.cache_keep_per_ticker),
            use_cache: self.use_cache.unwrap_or(defaults.use_cache),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            min_history_days: self.min_history_days.unwrap_or(defaults.min_history_days),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            fred_api_key: self.fred_api_key,
        };

        config.validate()?;
        Ok(config)
    }
}
