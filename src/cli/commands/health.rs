//! Health command implementation
//!
//! Checks the animals API once, or polls it until it answers or the wait
//! time runs out.

use crate::adapters::traits::AnimalSource;
use crate::adapters::SourceClient;
use crate::cli::load_cli_config;
use clap::Args;
use std::time::{Duration, Instant};

/// Arguments for the health command
#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Keep polling for up to this many seconds
    #[arg(long, value_name = "SECS")]
    pub wait: Option<u64>,

    /// Seconds between polls
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub interval: u64,
}

impl HealthArgs {
    /// Execute the health command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_cli_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let source = match SourceClient::new(&config.api, &config.pipeline) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to create API client: {e}");
                return Ok(5);
            }
        };

        let healthy = self.poll(&source).await;

        if healthy {
            tracing::info!(base_url = %config.api.base_url, "Animals API is healthy");
            println!("✅ Animals API at {} is healthy", config.api.base_url);
            Ok(0)
        } else {
            tracing::error!(base_url = %config.api.base_url, "Animals API health check failed");
            println!("❌ Animals API at {} is not healthy", config.api.base_url);
            Ok(4) // Connection error exit code
        }
    }

    async fn poll(&self, source: &dyn AnimalSource) -> bool {
        let deadline = self
            .wait
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let interval = Duration::from_secs(self.interval.max(1));

        loop {
            if source.health_check().await {
                return true;
            }

            let Some(deadline) = deadline else {
                return false;
            };

            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            tracing::info!("Animals API is not healthy, waiting...");
            tokio::time::sleep(interval.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, PipelineConfig};

    #[tokio::test]
    async fn test_poll_without_wait_checks_once() {
        let mut server = mockito::Server::new_async().await;
        let health = server
            .mock("GET", "/v1/animals")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let api = ApiConfig {
            base_url: server.url(),
            ..Default::default()
        };
        let source = SourceClient::new(&api, &PipelineConfig::default()).unwrap();
        let args = HealthArgs {
            wait: None,
            interval: 1,
        };

        assert!(!args.poll(&source).await);
        health.assert_async().await;
    }
}
