//! Domain error types
//!
//! This module defines the error hierarchy for the pipeline. All errors are
//! domain-specific and don't expose third-party HTTP client types.

use thiserror::Error;

/// Main pipeline error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source or destination API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Extraction aborted part-way through the listing
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// A batch larger than the destination accepts was handed to the client
    #[error("Batch too large: {size} > {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    /// Missing or corrupt intermediate payload
    #[error("Storage I/O error: {0}")]
    StorageIo(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl EtlError {
    /// Whether the error is worth retrying under the retry policy
    pub fn is_transient(&self) -> bool {
        matches!(self, EtlError::Api(api) if api.is_transient())
    }
}

/// Errors raised while talking to the source or destination API
///
/// Status codes are kept as plain integers so callers never see
/// `reqwest` types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, 5xx or 429; retried by the retry policy
    #[error("Transient service error ({}): {reason}", status_label(.status))]
    Transient { status: Option<u16>, reason: String },

    /// Non-transient 4xx; surfaced immediately
    #[error("Client error: {status} - {reason}")]
    Client { status: u16, reason: String },

    /// Retries exhausted on a transient failure
    #[error("External service error ({}): {reason}", status_label(.status))]
    ExternalService { status: Option<u16>, reason: String },

    /// Response body could not be understood
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify an HTTP status code that is not a success
    pub fn from_status(status: u16, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if status == 429 || (500..=599).contains(&status) {
            ApiError::Transient {
                status: Some(status),
                reason,
            }
        } else {
            ApiError::Client { status, reason }
        }
    }

    /// Build a transport-level transient error (no status available)
    pub fn transport(reason: impl Into<String>) -> Self {
        ApiError::Transient {
            status: None,
            reason: reason.into(),
        }
    }

    /// Whether the failure may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient { .. })
    }

    /// HTTP status associated with the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transient { status, .. } | ApiError::ExternalService { status, .. } => {
                *status
            }
            ApiError::Client { status, .. } => Some(*status),
            ApiError::InvalidResponse(_) => None,
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "transport".to_string(),
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for EtlError {
    fn from(err: serde_json::Error) -> Self {
        EtlError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for EtlError {
    fn from(err: toml::de::Error) -> Self {
        EtlError::Configuration(format!("TOML parse error: {err}"))
    }
}
