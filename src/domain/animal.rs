//! Animal record shapes
//!
//! Records pass through four shapes on their way through the pipeline:
//!
//! - [`ListingAnimal`] - lightweight item returned by the paginated listing
//! - [`RawAnimal`] - full detail record exactly as the source returned it
//! - [`NormalizedAnimal`] - validated canonical record
//! - [`DestinationAnimal`] - wire shape posted to the destination
//!
//! Only [`crate::core::transform::normalize`] turns a `RawAnimal` into a
//! `NormalizedAnimal`, so every normalized record has passed id and name
//! validation.

use super::errors::EtlError;
use super::result::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Species used when the source omits it or sends null
pub const UNKNOWN_SPECIES: &str = "Unknown";

fn default_species() -> String {
    UNKNOWN_SPECIES.to_string()
}

fn species_or_unknown<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_species))
}

/// Listing-shape animal as returned by `GET /v1/animals?page=N`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingAnimal {
    /// Animal identifier
    pub id: u64,

    /// Display name
    pub name: String,

    /// Species, defaulted to "Unknown"
    #[serde(default = "default_species", deserialize_with = "species_or_unknown")]
    pub species: String,

    /// Birth timestamp in whatever encoding the source used
    #[serde(default)]
    pub born_at: Option<Value>,
}

/// Detail-shape animal as returned by `GET /v1/animals/{id}`
///
/// Deserialization never rejects a JSON object: every field is kept as raw
/// JSON and coerced by the normalizer, which reports values it cannot use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAnimal {
    /// Integer, integral float or numeric string
    #[serde(default)]
    pub id: Option<Value>,

    #[serde(default)]
    pub name: Option<Value>,

    /// Missing or null means "Unknown"
    #[serde(default)]
    pub species: Option<Value>,

    /// Comma-delimited string, list of names, or absent
    #[serde(default)]
    pub friends: Option<Value>,

    /// Null, epoch seconds/milliseconds, or free-text date
    #[serde(default)]
    pub born_at: Option<Value>,

    #[serde(default)]
    pub habitat: Option<Value>,

    #[serde(default)]
    pub diet: Option<Value>,

    #[serde(default)]
    pub conservation_status: Option<Value>,
}

impl RawAnimal {
    /// Create a raw record with an id and name, everything else absent
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(Value::from(id)),
            name: Some(Value::String(name.into())),
            ..Default::default()
        }
    }

    /// Set the friends field
    pub fn with_friends(mut self, friends: Value) -> Self {
        self.friends = Some(friends);
        self
    }

    /// Set the born_at field
    pub fn with_born_at(mut self, born_at: Value) -> Self {
        self.born_at = Some(born_at);
        self
    }

    /// The id as an integer, if it can be read as one
    ///
    /// Accepts integers, floats without a fractional part and strings
    /// holding either.
    ///
    /// ```
    /// use animal_etl::domain::RawAnimal;
    /// use serde_json::json;
    ///
    /// let raw: RawAnimal = serde_json::from_value(json!({"id": "7"})).unwrap();
    /// assert_eq!(raw.numeric_id(), Some(7));
    ///
    /// let raw: RawAnimal = serde_json::from_value(json!({"id": 7.5})).unwrap();
    /// assert_eq!(raw.numeric_id(), None);
    /// ```
    pub fn numeric_id(&self) -> Option<i64> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            _ => None,
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    let in_range = value.is_finite() && value.abs() < i64::MAX as f64;
    (in_range && value.fract() == 0.0).then_some(value as i64)
}

/// Canonical in-pipeline animal record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAnimal {
    pub id: u64,

    /// Trimmed, never empty
    pub name: String,

    pub species: String,

    /// Trimmed, non-empty names in source order
    pub friends: Vec<String>,

    /// UTC instant with the zone stripped
    pub born_at: Option<NaiveDateTime>,

    pub habitat: Option<String>,

    pub diet: Option<String>,

    pub conservation_status: Option<String>,
}

/// Wire shape accepted by `POST /v1/home`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationAnimal {
    pub id: u64,
    pub name: String,
    pub friends: Vec<String>,

    /// ISO-8601 with a trailing `Z`, or null
    pub born_at: Option<String>,
}

impl DestinationAnimal {
    /// Format a zone-stripped UTC instant the way the destination expects
    pub fn format_born_at(born_at: &NaiveDateTime) -> String {
        format!("{}Z", born_at.format("%Y-%m-%dT%H:%M:%S%.f"))
    }
}

impl TryFrom<&NormalizedAnimal> for DestinationAnimal {
    type Error = EtlError;

    fn try_from(animal: &NormalizedAnimal) -> Result<Self> {
        let name = animal.name.trim();
        if name.is_empty() {
            return Err(EtlError::Validation(format!(
                "Animal {} has an empty name",
                animal.id
            )));
        }

        if animal.friends.iter().any(|f| f.trim().is_empty()) {
            return Err(EtlError::Validation(format!(
                "Animal {} has an empty friend entry",
                animal.id
            )));
        }

        Ok(Self {
            id: animal.id,
            name: name.to_string(),
            friends: animal.friends.clone(),
            born_at: animal.born_at.as_ref().map(Self::format_born_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn normalized() -> NormalizedAnimal {
        NormalizedAnimal {
            id: 7,
            name: "Lion".to_string(),
            species: "Panthera leo".to_string(),
            friends: vec!["Tiger".to_string(), "Bear".to_string()],
            born_at: NaiveDate::from_ymd_opt(2023, 11, 14)
                .and_then(|d| d.and_hms_opt(22, 13, 20)),
            habitat: None,
            diet: None,
            conservation_status: None,
        }
    }

    #[test]
    fn test_listing_species_defaults_when_missing() {
        let item: ListingAnimal = serde_json::from_value(json!({"id": 1, "name": "Lion"})).unwrap();
        assert_eq!(item.species, UNKNOWN_SPECIES);
    }

    #[test]
    fn test_listing_species_defaults_when_null() {
        let item: ListingAnimal =
            serde_json::from_value(json!({"id": 1, "name": "Lion", "species": null})).unwrap();
        assert_eq!(item.species, UNKNOWN_SPECIES);
    }

    #[test]
    fn test_listing_rejects_missing_id() {
        let result: std::result::Result<ListingAnimal, _> =
            serde_json::from_value(json!({"name": "Lion"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_animal_keeps_mixed_encodings() {
        let raw: RawAnimal = serde_json::from_value(json!({
            "id": 3,
            "name": "Bear",
            "friends": ["Lion", null, "Tiger"],
            "born_at": 1700000000,
            "habitat": "forest"
        }))
        .unwrap();

        assert_eq!(raw.numeric_id(), Some(3));
        assert_eq!(raw.species, None);
        assert_eq!(raw.friends, Some(json!(["Lion", null, "Tiger"])));
        assert_eq!(raw.born_at, Some(json!(1700000000)));
        assert_eq!(raw.habitat, Some(json!("forest")));
    }

    #[test]
    fn test_raw_animal_accepts_any_field_types() {
        for value in [
            json!({"id": 7, "name": "Rex", "habitat": 5}),
            json!({"id": "7", "name": "Rex"}),
            json!({"id": 7.0, "name": "Rex"}),
            json!({"id": 7, "name": "Rex", "species": 5}),
            json!({"id": 7, "name": "Rex", "diet": ["meat"]}),
            json!({"id": true, "name": {"first": "Rex"}, "conservation_status": null}),
        ] {
            let parsed: std::result::Result<RawAnimal, _> = serde_json::from_value(value.clone());
            assert!(parsed.is_ok(), "rejected {value}");
        }
    }

    #[test]
    fn test_numeric_id_coercion() {
        let id_of = |id: Value| {
            serde_json::from_value::<RawAnimal>(json!({ "id": id }))
                .unwrap()
                .numeric_id()
        };

        assert_eq!(id_of(json!(7)), Some(7));
        assert_eq!(id_of(json!(7.0)), Some(7));
        assert_eq!(id_of(json!("7")), Some(7));
        assert_eq!(id_of(json!(" 7.0 ")), Some(7));
        assert_eq!(id_of(json!(-2)), Some(-2));
        assert_eq!(id_of(json!(7.5)), None);
        assert_eq!(id_of(json!("seven")), None);
        assert_eq!(id_of(json!(true)), None);
        assert_eq!(id_of(json!([7])), None);
        assert_eq!(id_of(Value::Null), None);
    }

    #[test]
    fn test_destination_conversion() {
        let dest = DestinationAnimal::try_from(&normalized()).unwrap();
        assert_eq!(dest.id, 7);
        assert_eq!(dest.name, "Lion");
        assert_eq!(dest.friends, vec!["Tiger", "Bear"]);
        assert_eq!(dest.born_at.as_deref(), Some("2023-11-14T22:13:20Z"));
    }

    #[test]
    fn test_destination_conversion_without_born_at() {
        let mut animal = normalized();
        animal.born_at = None;
        let dest = DestinationAnimal::try_from(&animal).unwrap();
        assert_eq!(dest.born_at, None);

        let wire = serde_json::to_value(&dest).unwrap();
        assert_eq!(wire["born_at"], Value::Null);
    }

    #[test]
    fn test_destination_conversion_keeps_fractional_seconds() {
        let mut animal = normalized();
        animal.born_at = NaiveDate::from_ymd_opt(2020, 1, 2)
            .and_then(|d| d.and_hms_milli_opt(3, 4, 5, 250));
        let dest = DestinationAnimal::try_from(&animal).unwrap();
        assert_eq!(dest.born_at.as_deref(), Some("2020-01-02T03:04:05.250Z"));
    }

    #[test]
    fn test_destination_conversion_rejects_blank_name() {
        let mut animal = normalized();
        animal.name = "   ".to_string();
        assert!(DestinationAnimal::try_from(&animal).is_err());
    }
}
