//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use crate::config::{load_config, load_config_from_str, AppConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "animal-etl.toml";

/// Animal ETL - moves animal records from the source API to the home endpoint
#[derive(Parser, Debug)]
#[command(name = "animal-etl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "ANIMAL_ETL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ANIMAL_ETL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run extract, transform and load once
    Run(commands::run::RunArgs),

    /// Check that the animals API answers
    Health(commands::health::HealthArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Load the configuration for a command
///
/// A missing file at the default path is not an error: defaults plus
/// `ANIMAL_ETL_*` overrides are used instead. An explicitly named file must
/// exist.
pub fn load_cli_config(config_path: &str) -> Result<AppConfig> {
    if config_path == DEFAULT_CONFIG_PATH && !Path::new(config_path).exists() {
        tracing::info!(
            config_path = %config_path,
            "No configuration file found, using defaults and environment"
        );
        return load_config_from_str("");
    }

    load_config(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["animal-etl", "run"]);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_run_flags() {
        let cli = Cli::parse_from([
            "animal-etl",
            "run",
            "--run-id",
            "manual-1",
            "--dry-run",
            "--skip-health-check",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.run_id.as_deref(), Some("manual-1"));
                assert!(args.dry_run);
                assert!(args.skip_health_check);
            }
            other => panic!("Expected run command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["animal-etl", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["animal-etl", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_health() {
        let cli = Cli::parse_from(["animal-etl", "health", "--wait", "60", "--interval", "5"]);
        match cli.command {
            Commands::Health(args) => {
                assert_eq!(args.wait, Some(60));
                assert_eq!(args.interval, 5);
            }
            other => panic!("Expected health command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["animal-etl", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["animal-etl", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        assert!(load_cli_config("definitely-missing.toml").is_err());
    }
}
