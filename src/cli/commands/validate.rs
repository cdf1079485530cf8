//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the pipeline configuration file.

use crate::cli::load_cli_config;
use crate::config::{AppConfig, DESTINATION_BATCH_LIMIT};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_cli_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        print_summary(&config);
        Ok(0)
    }
}

fn print_summary(config: &AppConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!("  API Base URL: {}", config.api.base_url);
    println!("  Request Timeout: {}s", config.api.timeout_seconds);
    println!(
        "  Retries: {} attempts, {}ms base delay",
        config.api.retry.max_attempts, config.api.retry.base_delay_ms
    );
    println!(
        "  Max Concurrent Requests: {} (requests are issued sequentially)",
        config.api.max_concurrent_requests
    );
    println!("  Batch Size: {}", config.pipeline.batch_size);
    println!("  Destination Batch Limit: {DESTINATION_BATCH_LIMIT}");
    println!("  Max Listing Pages: {}", config.pipeline.max_pages);
    println!("  Work Directory: {}", config.pipeline.work_dir.display());
    if config.logging.local_enabled {
        println!(
            "  File Logging: {} ({})",
            config.logging.local_path, config.logging.local_rotation
        );
    } else {
        println!("  File Logging: disabled");
    }
    println!();
}
