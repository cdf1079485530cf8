//! Raw-to-canonical record normalization
//!
//! [`normalize`] is total: every input shape yields either a valid
//! [`NormalizedAnimal`] or a [`NormalizationError`]. It never panics and
//! never consults anything but its argument.

use super::timestamp::normalize_timestamp;
use crate::domain::{NormalizedAnimal, RawAnimal, RecordKey, UNKNOWN_SPECIES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why a record could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationErrorKind {
    /// `id` missing, negative or not an integer
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// `name` missing or blank after trimming
    #[error("Name cannot be empty")]
    EmptyName,

    /// A field had a shape that cannot be coerced
    #[error("Malformed {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },
}

/// Per-record normalization failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to normalize animal {}: {kind}", display_id(.animal_id))]
pub struct NormalizationError {
    /// Id of the record, when it had a usable one
    pub animal_id: Option<i64>,

    pub kind: NormalizationErrorKind,
}

fn display_id(id: &Option<i64>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "<missing id>".to_string(),
    }
}

impl NormalizationError {
    fn new(animal_id: Option<i64>, kind: NormalizationErrorKind) -> Self {
        Self { animal_id, kind }
    }

    /// Bucket this failure for reporting
    pub fn category(&self) -> FailureCategory {
        FailureCategory::classify(&self.kind)
    }

    /// Key identifying the failed record; falls back to its position
    pub fn record_key(&self, index: usize) -> RecordKey {
        match self.animal_id {
            Some(id) => RecordKey::Id(id),
            None => RecordKey::Index(index),
        }
    }
}

/// Failure bucket used in transform summaries
///
/// Buckets are for reporting only and never change control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    DateParsing,
    FriendsParsing,
    ValidationError,
    Unknown,
}

impl FailureCategory {
    /// Classify a normalization failure
    pub fn classify(kind: &NormalizationErrorKind) -> Self {
        match kind {
            NormalizationErrorKind::InvalidId(_) | NormalizationErrorKind::EmptyName => {
                FailureCategory::ValidationError
            }
            NormalizationErrorKind::MalformedField { field, .. } => match *field {
                "born_at" => FailureCategory::DateParsing,
                "friends" => FailureCategory::FriendsParsing,
                "species" | "habitat" | "diet" | "conservation_status" => {
                    FailureCategory::ValidationError
                }
                _ => FailureCategory::Unknown,
            },
        }
    }

    /// Snake-case label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::DateParsing => "date_parsing",
            FailureCategory::FriendsParsing => "friends_parsing",
            FailureCategory::ValidationError => "validation_error",
            FailureCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize one detail-shape record
///
/// # Examples
///
/// ```
/// use animal_etl::core::transform::normalize;
/// use animal_etl::domain::RawAnimal;
/// use serde_json::json;
///
/// let raw = RawAnimal::new(1, "  Lion ").with_friends(json!("Tiger, , Bear"));
/// let animal = normalize(&raw).unwrap();
///
/// assert_eq!(animal.name, "Lion");
/// assert_eq!(animal.friends, vec!["Tiger", "Bear"]);
///
/// assert!(normalize(&RawAnimal::new(2, "   ")).is_err());
/// ```
pub fn normalize(raw: &RawAnimal) -> Result<NormalizedAnimal, NormalizationError> {
    let animal_id = raw.numeric_id();
    let id = match (animal_id, raw.id.as_ref()) {
        (Some(id), _) if id >= 0 => id as u64,
        (Some(id), _) => {
            return Err(NormalizationError::new(
                Some(id),
                NormalizationErrorKind::InvalidId(id.to_string()),
            ))
        }
        (None, None | Some(Value::Null)) => {
            return Err(NormalizationError::new(
                None,
                NormalizationErrorKind::InvalidId("missing".to_string()),
            ))
        }
        (None, Some(other)) => {
            return Err(NormalizationError::new(
                None,
                NormalizationErrorKind::InvalidId(other.to_string()),
            ))
        }
    };

    let fail = |kind| NormalizationError::new(animal_id, kind);

    let name = normalize_name(raw.name.as_ref()).map_err(fail)?;
    let friends = normalize_friends(raw.friends.as_ref()).map_err(fail)?;
    let species = optional_text("species", raw.species.as_ref())
        .map_err(fail)?
        .unwrap_or_else(|| UNKNOWN_SPECIES.to_string());
    let habitat = optional_text("habitat", raw.habitat.as_ref()).map_err(fail)?;
    let diet = optional_text("diet", raw.diet.as_ref()).map_err(fail)?;
    let conservation_status =
        optional_text("conservation_status", raw.conservation_status.as_ref()).map_err(fail)?;

    Ok(NormalizedAnimal {
        id,
        name,
        species,
        friends,
        born_at: normalize_timestamp(raw.born_at.as_ref()),
        habitat,
        diet,
        conservation_status,
    })
}

/// Scalars as text, absent or null as `None`
fn optional_text(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Option<String>, NormalizationErrorKind> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            Ok(Some(scalar_text(scalar)))
        }
        Some(other) => Err(NormalizationErrorKind::MalformedField {
            field,
            reason: format!("expected text, got {}", type_name(other)),
        }),
    }
}

fn normalize_name(value: Option<&Value>) -> Result<String, NormalizationErrorKind> {
    let name = match value {
        None | Some(Value::Null) => return Err(NormalizationErrorKind::EmptyName),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(NormalizationErrorKind::MalformedField {
                field: "name",
                reason: format!("expected a string, got {}", type_name(other)),
            })
        }
    };

    if name.is_empty() {
        return Err(NormalizationErrorKind::EmptyName);
    }

    Ok(name)
}

/// Split or collect friend names, trimming and dropping empty entries
fn normalize_friends(value: Option<&Value>) -> Result<Vec<String>, NormalizationErrorKind> {
    let entries: Vec<String> = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(scalar_text)
            .collect(),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => vec![scalar_text(scalar)],
        Some(other) => {
            return Err(NormalizationErrorKind::MalformedField {
                field: "friends",
                reason: format!("expected a string or a list, got {}", type_name(other)),
            })
        }
    };

    Ok(entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect())
}

/// Text of a JSON value, with strings unquoted
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
