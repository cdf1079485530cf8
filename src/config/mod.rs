//! Configuration management.
//!
//! The pipeline uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - `ANIMAL_ETL_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use animal_etl::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("animal-etl.toml")?;
//!
//! println!("Animals API: {}", config.api.base_url);
//! println!("Batch size: {}", config.pipeline.batch_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`ApiConfig`] - Base URL, timeouts and [`RetryConfig`]
//! - [`PipelineConfig`] - Batch size, page ceiling and work directory
//! - [`LoggingConfig`] - Optional JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "${ANIMALS_API_BASE_URL}"
//! timeout_seconds = 30
//!
//! [api.retry]
//! max_attempts = 3
//! base_delay_ms = 1000
//!
//! [pipeline]
//! batch_size = 100
//! max_pages = 1000
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApiConfig, AppConfig, ApplicationConfig, LoggingConfig, PipelineConfig, RetryConfig,
    DESTINATION_BATCH_LIMIT,
};
