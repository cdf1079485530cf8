//! HTTP helpers shared by the source and destination clients
//!
//! Responses are classified here so that `reqwest` types never leave the
//! adapters layer.

use crate::domain::{ApiError, EtlError, Result};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;

/// Longest response body excerpt carried in an error message
const MAX_BODY_EXCERPT: usize = 200;

/// Build the HTTP client used for every request of one adapter
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(30)))
        .build()
        .map_err(|e| EtlError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Join the configured base URL and an absolute API path
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Map a failed `send()` or body read to a transient error
pub(crate) fn transport_error(error: reqwest::Error) -> EtlError {
    ApiError::transport(error.to_string()).into()
}

/// Read a whole response body
///
/// A connection dropped mid-body is a transport failure, not a bad payload.
pub(crate) async fn read_body(response: Response) -> Result<Vec<u8>> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    Ok(bytes.to_vec())
}

/// Pass 2xx responses through; classify everything else
///
/// 429 and 5xx become [`ApiError::Transient`], other statuses
/// [`ApiError::Client`].
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {}", excerpt(&body))
    };

    Err(ApiError::from_status(status.as_u16(), reason).into())
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            endpoint("http://localhost:3123/", "/v1/home"),
            "http://localhost:3123/v1/home"
        );
        assert_eq!(
            endpoint("http://localhost:3123", "/v1/animals"),
            "http://localhost:3123/v1/animals"
        );
    }

    #[test]
    fn test_excerpt_limits_length() {
        let long = "x".repeat(500);
        assert_eq!(excerpt(&long).len(), MAX_BODY_EXCERPT);
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }
}
