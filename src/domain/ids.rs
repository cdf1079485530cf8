//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for pipeline identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline run identifier newtype wrapper
///
/// Every stage invocation receives the run id explicitly; it namespaces the
/// intermediate files written for that run, so only characters that are safe
/// in file names are accepted.
///
/// # Examples
///
/// ```
/// use animal_etl::domain::ids::RunId;
/// use std::str::FromStr;
///
/// let run_id = RunId::from_str("manual__2025-01-01").unwrap();
/// assert_eq!(run_id.as_str(), "manual__2025-01-01");
/// assert!(RunId::from_str("../escape").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Creates a new RunId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(RunId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Run ID cannot be empty".to_string());
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            || id.starts_with('.')
        {
            return Err(format!(
                "Invalid run ID '{id}'. Only ASCII letters, digits, '-', '_' and '.' are allowed"
            ));
        }

        Ok(Self(id))
    }

    /// Generates a fresh random run id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the run ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Key identifying a record that failed transformation
///
/// Records without a usable id are identified by their position in the
/// input batch instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKey {
    /// Animal id as reported by the source
    Id(i64),
    /// Position in the input batch
    Index(usize),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "{id}"),
            RecordKey::Index(index) => write!(f, "index_{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_valid() {
        let run_id = RunId::new("scheduled__2025-01-01T02.00.00").unwrap();
        assert_eq!(run_id.to_string(), "scheduled__2025-01-01T02.00.00");
    }

    #[test]
    fn test_run_id_rejects_empty() {
        assert!(RunId::new("").is_err());
        assert!(RunId::new("   ").is_err());
    }

    #[test]
    fn test_run_id_rejects_path_characters() {
        assert!(RunId::new("a/b").is_err());
        assert!(RunId::new("..").is_err());
        assert!(RunId::new("run id").is_err());
    }

    #[test]
    fn test_generated_run_ids_are_unique_and_valid() {
        let a = RunId::generate();
        let b = RunId::generate();
        assert_ne!(a, b);
        assert!(RunId::new(a.as_str()).is_ok());
    }

    #[test]
    fn test_record_key_display() {
        assert_eq!(RecordKey::Id(42).to_string(), "42");
        assert_eq!(RecordKey::Index(3).to_string(), "index_3");
    }
}
