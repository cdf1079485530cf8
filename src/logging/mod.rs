//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON-formatted local file logs with rotation
//!
//! # Example
//!
//! ```no_run
//! use animal_etl::logging::init_logging;
//! use animal_etl::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use animal_etl::log_stage_start;
/// use animal_etl::domain::RunId;
///
/// let run_id = RunId::generate();
/// log_stage_start!("extract", &run_id);
/// ```
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr, $run_id:expr) => {
        tracing::info!(
            stage = $stage,
            run_id = %$run_id,
            "Starting stage"
        );
    };
}

/// Log the completion of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use animal_etl::log_stage_complete;
/// use std::time::Duration;
///
/// log_stage_complete!("load", 42, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            stage = $stage,
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Stage completed"
        );
    };
}

/// Log a batch processing step
///
/// # Example
///
/// ```no_run
/// use animal_etl::log_batch_processing;
///
/// log_batch_processing!(3, 10);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / ($total as f64).max(1.0) * 100.0),
            "Processing batch"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use animal_etl::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
