//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = crate::cli::DEFAULT_CONFIG_PATH)]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing animal-etl configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Check the API: animal-etl health");
                println!("  3. Validate configuration: animal-etl validate-config");
                println!("  4. Run the pipeline: animal-etl run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate the sample configuration
    fn generate_config() -> String {
        r#"# animal-etl configuration
#
# Every key may be overridden with an ANIMAL_ETL_<SECTION>_<KEY> environment
# variable, e.g. ANIMAL_ETL_API_BASE_URL. Values may reference ${VAR}.

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Extract and transform only, never post to the destination
dry_run = false

[api]
# Serves GET /v1/animals, GET /v1/animals/{id} and POST /v1/home
base_url = "http://localhost:3123"
timeout_seconds = 30
health_check_timeout_seconds = 10

# Requests are issued one at a time; kept for compatibility
max_concurrent_requests = 10

[api.retry]
# Attempts per request, including the first
max_attempts = 3
base_delay_ms = 1000
max_delay_ms = 60000
backoff_multiplier = 2.0

[pipeline]
# Ids fetched and transformed together
batch_size = 100

# Stop paging the listing after this many pages
max_pages = 1000

# Run-scoped intermediate files are written here and removed after each run
# work_dir = "/tmp/animal-etl"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"  # daily | hourly | never
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_is_valid() {
        let config = load_config_from_str(&InitArgs::generate_config()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3123");
        assert_eq!(config.pipeline.batch_size, 100);
        assert_eq!(config.api.retry.max_attempts, 3);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("animal-etl.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("animal-etl.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            force: true,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[pipeline]"));
    }
}
