//! Result type alias for the pipeline
//!
//! This module provides a convenient Result type alias that uses `EtlError`
//! as the error type.

use super::errors::EtlError;

/// Result type alias for pipeline operations
///
/// # Examples
///
/// ```
/// use animal_etl::domain::result::Result;
/// use animal_etl::domain::errors::EtlError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(EtlError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, EtlError>;
