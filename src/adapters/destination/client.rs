//! HTTP client for the animals destination API

use crate::adapters::http::{build_client, check_status, endpoint, transport_error};
use crate::adapters::retry::RetryPolicy;
use crate::adapters::traits::AnimalSink;
use crate::config::{ApiConfig, DESTINATION_BATCH_LIMIT};
use crate::domain::{DestinationAnimal, EtlError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Destination API client
#[derive(Debug, Clone)]
pub struct DestinationClient {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
    health_check_timeout: Duration,
}

impl DestinationClient {
    /// Create a client from the API configuration
    pub fn new(api: &ApiConfig) -> Result<Self> {
        Ok(Self {
            base_url: api.base_url.clone(),
            client: build_client(api.timeout())?,
            retry: api.retry.policy(),
            health_check_timeout: api.health_check_timeout(),
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn post_once(&self, url: &str, payload: &[u8]) -> Result<()> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;
        tracing::debug!(status = %response.status(), "Destination accepted batch");
        Ok(())
    }
}

#[async_trait]
impl AnimalSink for DestinationClient {
    async fn send_batch(&self, animals: &[DestinationAnimal]) -> Result<bool> {
        if animals.len() > DESTINATION_BATCH_LIMIT {
            return Err(EtlError::BatchTooLarge {
                size: animals.len(),
                limit: DESTINATION_BATCH_LIMIT,
            });
        }

        let payload = match serde_json::to_vec(animals) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Cannot serialize animals to JSON");
                return Ok(false);
            }
        };

        tracing::info!(
            count = animals.len(),
            payload_bytes = payload.len(),
            "Sending animals to destination"
        );

        let url = endpoint(&self.base_url, "/v1/home");
        self.retry
            .execute("send_batch", || self.post_once(&url, &payload))
            .await?;

        tracing::info!(count = animals.len(), "Successfully sent animals to destination");
        Ok(true)
    }

    async fn health_check(&self) -> bool {
        let url = endpoint(&self.base_url, "/v1/animals");
        let result = self
            .client
            .get(&url)
            .query(&[("page", 1)])
            .timeout(self.health_check_timeout)
            .send()
            .await;

        match result {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!(error = %e, "Destination health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApiError;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> DestinationClient {
        let api = ApiConfig {
            base_url: server.url(),
            ..Default::default()
        };
        DestinationClient::new(&api)
            .unwrap()
            .with_retry_policy(RetryPolicy::immediate(3))
    }

    fn animals(count: usize) -> Vec<DestinationAnimal> {
        (0..count)
            .map(|i| DestinationAnimal {
                id: i as u64,
                name: format!("Animal {i}"),
                friends: vec![],
                born_at: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_batch_too_large_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let home = server
            .mock("POST", "/v1/home")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.send_batch(&animals(101)).await;

        home.assert_async().await;
        assert!(matches!(
            result,
            Err(EtlError::BatchTooLarge {
                size: 101,
                limit: 100
            })
        ));
    }

    #[tokio::test]
    async fn test_send_batch_posts_json_array() {
        let mut server = mockito::Server::new_async().await;
        let home = server
            .mock("POST", "/v1/home")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!([
                { "id": 0, "name": "Animal 0", "friends": [], "born_at": null },
                { "id": 1, "name": "Animal 1", "friends": [], "born_at": null }
            ])))
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let sent = client.send_batch(&animals(2)).await.unwrap();

        home.assert_async().await;
        assert!(sent);
    }

    #[tokio::test]
    async fn test_server_error_retried_then_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let home = server
            .mock("POST", "/v1/home")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.send_batch(&animals(1)).await;

        home.assert_async().await;
        assert!(matches!(
            result,
            Err(EtlError::Api(ApiError::ExternalService {
                status: Some(503),
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn test_client_error_surfaced_immediately() {
        let mut server = mockito::Server::new_async().await;
        let home = server
            .mock("POST", "/v1/home")
            .with_status(422)
            .with_body("invalid payload")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.send_batch(&animals(1)).await;

        home.assert_async().await;
        match result {
            Err(EtlError::Api(ApiError::Client { status, reason })) => {
                assert_eq!(status, 422);
                assert!(reason.contains("invalid payload"));
            }
            other => panic!("Expected client error, got {other:?}"),
        }
    }
}
