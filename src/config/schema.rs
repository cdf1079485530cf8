//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.

use crate::adapters::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Largest batch the destination accepts in one request
pub const DESTINATION_BATCH_LIMIT: usize = 100;

/// Main pipeline configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source/destination API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Pipeline stage settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.pipeline.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (extract and transform, never post to the destination)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Retry configuration shared by the source and destination clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for any single delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("api.retry.max_attempts must be at least 1".to_string());
        }

        if self.max_attempts > 20 {
            return Err("api.retry.max_attempts cannot exceed 20".to_string());
        }

        if self.backoff_multiplier < 1.0 || !self.backoff_multiplier.is_finite() {
            return Err("api.retry.backoff_multiplier must be a finite value >= 1.0".to_string());
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err("api.retry.max_delay_ms must be >= api.retry.base_delay_ms".to_string());
        }

        Ok(())
    }

    /// Build the retry policy described by this configuration
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.backoff_multiplier,
        )
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Animals API configuration
///
/// The source listing/detail endpoints and the destination endpoint are
/// served under the same base URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the animals API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Timeout used by health checks, in seconds
    #[serde(default = "default_health_check_timeout_seconds")]
    pub health_check_timeout_seconds: u64,

    /// Reserved. Requests are always issued one at a time; the value is
    /// validated and reported but does not change behaviour.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("api.base_url is not a valid URL: {e}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("api.base_url must start with http:// or https://".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("api.timeout_seconds must be greater than 0".to_string());
        }

        if self.health_check_timeout_seconds == 0 {
            return Err("api.health_check_timeout_seconds must be greater than 0".to_string());
        }

        if self.max_concurrent_requests == 0 {
            return Err("api.max_concurrent_requests must be greater than 0".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Health check timeout as a duration
    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            health_check_timeout_seconds: default_health_check_timeout_seconds(),
            max_concurrent_requests: default_max_concurrent_requests(),
            retry: RetryConfig::default(),
        }
    }
}

/// Pipeline stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of ids whose details are fetched and transformed together
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Safety ceiling on listing pages, for sources that never stop
    /// reporting another page
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Directory holding run-scoped intermediate files
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("pipeline.batch_size must be greater than 0".to_string());
        }

        if self.max_pages == 0 {
            return Err("pipeline.max_pages must be greater than 0".to_string());
        }

        if self.work_dir.as_os_str().is_empty() {
            return Err("pipeline.work_dir cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_pages: default_max_pages(),
            work_dir: default_work_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3123".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_health_check_timeout_seconds() -> u64 {
    10
}

fn default_max_concurrent_requests() -> usize {
    10
}

fn default_max_attempts() -> usize {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_batch_size() -> usize {
    DESTINATION_BATCH_LIMIT
}

fn default_max_pages() -> u32 {
    1000
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("animal-etl")
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
