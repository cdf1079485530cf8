//! Batch normalization and destination conversion

use super::normalize::{normalize, FailureCategory};
use crate::domain::{DestinationAnimal, NormalizedAnimal, RawAnimal, RecordKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of ids shown per bucket in the failure breakdown log
const LOGGED_IDS_PER_BUCKET: usize = 5;

/// Failed records grouped by failure category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformFailures {
    buckets: BTreeMap<FailureCategory, Vec<RecordKey>>,
}

impl TransformFailures {
    /// Create an empty failure summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed record
    pub fn add(&mut self, category: FailureCategory, key: RecordKey) {
        self.buckets.entry(category).or_default().push(key);
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: TransformFailures) {
        for (category, keys) in other.buckets {
            self.buckets.entry(category).or_default().extend(keys);
        }
    }

    /// Total number of failed records across buckets
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Keys of the records failed under `category`
    pub fn get(&self, category: FailureCategory) -> &[RecordKey] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate buckets in category order
    pub fn iter(&self) -> impl Iterator<Item = (FailureCategory, &[RecordKey])> {
        self.buckets.iter().map(|(c, keys)| (*c, keys.as_slice()))
    }

    fn log_breakdown(&self) {
        for (category, keys) in self.iter() {
            let shown: Vec<String> = keys
                .iter()
                .take(LOGGED_IDS_PER_BUCKET)
                .map(ToString::to_string)
                .collect();

            tracing::warn!(
                category = %category,
                count = keys.len(),
                ids = %shown.join(", "),
                more = keys.len().saturating_sub(LOGGED_IDS_PER_BUCKET),
                "Transformation failures"
            );
        }
    }
}

/// Result of normalizing one collection of raw records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutcome {
    /// Successfully normalized records, in input order
    pub animals: Vec<NormalizedAnimal>,

    pub failures: TransformFailures,
}

impl TransformOutcome {
    /// Number of records that went in
    pub fn total(&self) -> usize {
        self.animals.len() + self.failures.total()
    }
}

/// Drives normalization over record collections
pub struct BatchTransformer;

impl BatchTransformer {
    /// Normalize every record independently
    ///
    /// Every input is either in `animals` or counted in `failures`; nothing
    /// is dropped silently.
    ///
    /// # Examples
    ///
    /// ```
    /// use animal_etl::core::transform::BatchTransformer;
    /// use animal_etl::domain::RawAnimal;
    ///
    /// let raws = vec![RawAnimal::new(1, "Lion"), RawAnimal::new(2, " ")];
    /// let outcome = BatchTransformer::transform_batch(&raws);
    ///
    /// assert_eq!(outcome.animals.len(), 1);
    /// assert_eq!(outcome.failures.total(), 1);
    /// ```
    pub fn transform_batch(raws: &[RawAnimal]) -> TransformOutcome {
        Self::transform_batch_at(raws, 0)
    }

    /// Like [`transform_batch`](Self::transform_batch), for a slice that
    /// starts `first_index` records into a longer stream
    ///
    /// Records without a usable id are keyed by their position in the
    /// whole stream.
    pub fn transform_batch_at(raws: &[RawAnimal], first_index: usize) -> TransformOutcome {
        tracing::debug!(count = raws.len(), first_index = first_index, "Transforming batch of animals");

        let mut outcome = TransformOutcome::default();

        for (index, raw) in raws.iter().enumerate() {
            match normalize(raw) {
                Ok(animal) => outcome.animals.push(animal),
                Err(e) => {
                    let index = first_index + index;
                    tracing::warn!(error = %e, index = index, "Skipping animal");
                    outcome.failures.add(e.category(), e.record_key(index));
                }
            }
        }

        if !outcome.failures.is_empty() {
            tracing::warn!(
                total = raws.len(),
                successful = outcome.animals.len(),
                failed = outcome.failures.total(),
                "Transformation summary"
            );
            outcome.failures.log_breakdown();
        }

        outcome
    }

    /// Convert normalized records to the destination wire shape
    ///
    /// Records that fail conversion are skipped; the second value is how
    /// many were skipped.
    pub fn to_destination_format(
        animals: &[NormalizedAnimal],
    ) -> (Vec<DestinationAnimal>, usize) {
        let mut converted = Vec::with_capacity(animals.len());
        let mut skipped = 0;

        for (index, animal) in animals.iter().enumerate() {
            match DestinationAnimal::try_from(animal) {
                Ok(destination) => converted.push(destination),
                Err(e) => {
                    skipped += 1;
                    tracing::error!(
                        index = index,
                        animal_id = animal.id,
                        error = %e,
                        "Failed to convert animal to destination format"
                    );
                }
            }
        }

        if skipped > 0 {
            tracing::warn!(skipped = skipped, "Skipped animals during conversion");
        }
        tracing::debug!(count = converted.len(), "Converted animals to destination format");

        (converted, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_input() {
        let outcome = BatchTransformer::transform_batch(&[]);
        assert!(outcome.animals.is_empty());
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.total(), 0);
    }

    #[test]
    fn test_counts_always_add_up() {
        let raws: Vec<RawAnimal> = vec![
            RawAnimal::new(1, "Lion"),
            RawAnimal::new(-1, "Bad id"),
            RawAnimal::new(2, ""),
            RawAnimal::new(3, "Bat").with_friends(json!({ "x": 1 })),
            serde_json::from_value(json!({ "name": "No id" })).unwrap(),
            RawAnimal::new(4, "Cat").with_born_at(json!("garbage")),
        ];

        let outcome = BatchTransformer::transform_batch(&raws);

        assert_eq!(outcome.total(), raws.len());
        assert_eq!(outcome.animals.len(), 2);
        assert_eq!(
            outcome.failures.get(FailureCategory::ValidationError),
            &[RecordKey::Id(-1), RecordKey::Id(2), RecordKey::Index(4)]
        );
        assert_eq!(
            outcome.failures.get(FailureCategory::FriendsParsing),
            &[RecordKey::Id(3)]
        );
        assert!(outcome.failures.get(FailureCategory::DateParsing).is_empty());
    }

    #[test]
    fn test_index_keys_offset_by_stream_position() {
        let nameless: RawAnimal = serde_json::from_value(json!({ "name": "No id" })).unwrap();
        let raws = vec![RawAnimal::new(1, "Lion"), nameless];

        let outcome = BatchTransformer::transform_batch_at(&raws, 40);

        assert_eq!(
            outcome.failures.get(FailureCategory::ValidationError),
            &[RecordKey::Index(41)]
        );
    }

    #[test]
    fn test_success_order_preserved() {
        let raws: Vec<RawAnimal> = (1..=5).map(|i| RawAnimal::new(i, format!("A{i}"))).collect();
        let outcome = BatchTransformer::transform_batch(&raws);
        let ids: Vec<u64> = outcome.animals.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_merge_failures() {
        let mut first = TransformFailures::new();
        first.add(FailureCategory::ValidationError, RecordKey::Id(1));

        let mut second = TransformFailures::new();
        second.add(FailureCategory::ValidationError, RecordKey::Id(2));
        second.add(FailureCategory::Unknown, RecordKey::Index(0));

        first.merge(second);
        assert_eq!(first.total(), 3);
        assert_eq!(first.get(FailureCategory::ValidationError).len(), 2);
    }

    #[test]
    fn test_to_destination_format_skips_invalid() {
        let raws = vec![RawAnimal::new(1, "Lion"), RawAnimal::new(2, "Zebra")];
        let mut animals = BatchTransformer::transform_batch(&raws).animals;
        animals[1].name = "   ".to_string();

        let (converted, skipped) = BatchTransformer::to_destination_format(&animals);

        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].id, 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_to_destination_format_formats_born_at() {
        let raws = vec![RawAnimal::new(1, "Lion").with_born_at(json!(1700000000))];
        let animals = BatchTransformer::transform_batch(&raws).animals;

        let (converted, _) = BatchTransformer::to_destination_format(&animals);
        assert_eq!(converted[0].born_at.as_deref(), Some("2023-11-14T22:13:20Z"));
    }
}
