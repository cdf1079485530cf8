//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AppConfig;
use crate::domain::errors::EtlError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "ANIMAL_ETL";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AppConfig
/// 4. Applies environment variable overrides (ANIMAL_ETL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use animal_etl::config::loader::load_config;
///
/// let config = load_config("animal-etl.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EtlError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        EtlError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Applies the same substitution, override and validation steps as
/// [`load_config`].
pub fn load_config_from_str(contents: &str) -> Result<AppConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AppConfig = toml::from_str(&contents)
        .map_err(|e| EtlError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        EtlError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| EtlError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Comments are copied verbatim
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(EtlError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}")).ok()
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        EtlError::Configuration(format!(
            "Invalid value '{value}' for environment override {ENV_PREFIX}_{key}"
        ))
    })
}

/// Applies environment variable overrides using the ANIMAL_ETL_* prefix
///
/// Environment variables follow the pattern: ANIMAL_ETL_<SECTION>_<KEY>
/// For example: ANIMAL_ETL_API_BASE_URL, ANIMAL_ETL_PIPELINE_BATCH_SIZE
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_var("APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("APPLICATION_DRY_RUN", &val)?;
    }

    // API overrides
    if let Some(val) = env_var("API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = env_var("API_TIMEOUT_SECONDS") {
        config.api.timeout_seconds = parse_override("API_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = env_var("API_MAX_CONCURRENT_REQUESTS") {
        config.api.max_concurrent_requests =
            parse_override("API_MAX_CONCURRENT_REQUESTS", &val)?;
    }
    if let Some(val) = env_var("API_RETRY_MAX_ATTEMPTS") {
        config.api.retry.max_attempts = parse_override("API_RETRY_MAX_ATTEMPTS", &val)?;
    }
    if let Some(val) = env_var("API_RETRY_BASE_DELAY_MS") {
        config.api.retry.base_delay_ms = parse_override("API_RETRY_BASE_DELAY_MS", &val)?;
    }

    // Pipeline overrides
    if let Some(val) = env_var("PIPELINE_BATCH_SIZE") {
        config.pipeline.batch_size = parse_override("PIPELINE_BATCH_SIZE", &val)?;
    }
    if let Some(val) = env_var("PIPELINE_MAX_PAGES") {
        config.pipeline.max_pages = parse_override("PIPELINE_MAX_PAGES", &val)?;
    }
    if let Some(val) = env_var("PIPELINE_WORK_DIR") {
        config.pipeline.work_dir = PathBuf::from(val);
    }

    // Logging overrides
    if let Some(val) = env_var("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = env_var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("ANIMAL_LOADER_TEST_VAR", "test_value");
        let input = "base_url = \"${ANIMAL_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "base_url = \"test_value\"\n");
        std::env::remove_var("ANIMAL_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("ANIMAL_LOADER_MISSING_VAR");
        let input = "base_url = \"${ANIMAL_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("ANIMAL_LOADER_COMMENTED_VAR");
        let input = "# base_url = \"${ANIMAL_LOADER_COMMENTED_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${ANIMAL_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(EtlError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[api]
base_url = "https://animals.example.com"
timeout_seconds = 15

[api.retry]
max_attempts = 4
base_delay_ms = 250

[pipeline]
batch_size = 50
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.api.base_url, "https://animals.example.com");
        assert_eq!(config.api.timeout_seconds, 15);
        assert_eq!(config.api.retry.max_attempts, 4);
        assert_eq!(config.api.retry.base_delay_ms, 250);
        assert_eq!(config.pipeline.batch_size, 50);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let result = load_config_from_str("[pipeline]\nbatch_size = 0\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }
}
