//! Stage and run summaries
//!
//! This module defines structures for tracking and reporting load results
//! and whole-run outcomes.

use crate::core::transform::TransformFailures;
use crate::domain::RunId;
use std::time::Duration;

/// Result of attempting one load batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub batch_index: usize,

    /// Number of animals in the batch
    pub animals: usize,

    /// Failure reason; `None` when the destination accepted the batch
    pub error: Option<String>,
}

impl BatchOutcome {
    /// Batch accepted by the destination
    pub fn loaded(batch_index: usize, animals: usize) -> Self {
        Self {
            batch_index,
            animals,
            error: None,
        }
    }

    /// Batch that could not be loaded
    pub fn failed(batch_index: usize, animals: usize, reason: impl Into<String>) -> Self {
        Self {
            batch_index,
            animals,
            error: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate outcome of one load stage invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub total_batches: usize,
    pub successful_batches: usize,
    pub failed_batches: usize,

    /// Animals in successfully loaded batches
    pub total_animals: usize,

    /// Indices of batches that failed, in load order
    pub failed_batch_indices: Vec<usize>,
}

impl LoadSummary {
    /// Build the summary from per-batch outcomes
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let mut summary = Self {
            total_batches: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            if outcome.is_success() {
                summary.successful_batches += 1;
                summary.total_animals += outcome.animals;
            } else {
                summary.failed_batches += 1;
                summary.failed_batch_indices.push(outcome.batch_index);
            }
        }

        summary
    }

    /// Check if every batch was loaded
    pub fn is_successful(&self) -> bool {
        self.failed_batches == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_batches == 0 {
            return 100.0;
        }
        (self.successful_batches as f64 / self.total_batches as f64) * 100.0
    }
}

/// Outcome of one full pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: RunId,

    /// Load was skipped
    pub dry_run: bool,

    /// Animals returned by the listing
    pub listed_animals: usize,

    /// Ids whose detail fetch failed
    pub failed_detail_ids: Vec<u64>,

    /// Records that failed normalization, by category
    pub transform_failures: TransformFailures,

    /// Records dropped while converting to the destination shape
    pub skipped_conversions: usize,

    /// Load batches written by the transform stage
    pub prepared_batches: usize,

    /// Animals written into load batches
    pub prepared_animals: usize,

    /// `None` on a dry run
    pub load: Option<LoadSummary>,

    /// Intermediate files removed by the final cleanup
    pub cleaned_files: usize,

    pub duration: Duration,
}

impl PipelineReport {
    /// Whether any record or batch was lost along the way
    pub fn has_failures(&self) -> bool {
        !self.failed_detail_ids.is_empty()
            || !self.transform_failures.is_empty()
            || self.skipped_conversions > 0
            || self.load.as_ref().is_some_and(|load| !load.is_successful())
    }

    /// Log the report at info level
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            dry_run = self.dry_run,
            listed = self.listed_animals,
            detail_failures = self.failed_detail_ids.len(),
            transform_failures = self.transform_failures.total(),
            skipped_conversions = self.skipped_conversions,
            prepared_batches = self.prepared_batches,
            prepared_animals = self.prepared_animals,
            duration_secs = self.duration.as_secs_f64(),
            "Pipeline run finished"
        );

        if let Some(load) = &self.load {
            tracing::info!(
                total_batches = load.total_batches,
                successful_batches = load.successful_batches,
                failed_batches = load.failed_batches,
                loaded_animals = load.total_animals,
                success_rate = %format!("{:.1}%", load.success_rate()),
                "Load summary"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::FailureCategory;
    use crate::domain::RecordKey;

    #[test]
    fn test_summary_from_outcomes() {
        let outcomes = vec![
            BatchOutcome::loaded(0, 100),
            BatchOutcome::failed(1, 100, "HTTP 500"),
            BatchOutcome::loaded(2, 50),
        ];

        let summary = LoadSummary::from_outcomes(&outcomes);

        assert_eq!(summary.total_batches, 3);
        assert_eq!(summary.successful_batches, 2);
        assert_eq!(summary.failed_batches, 1);
        assert_eq!(summary.total_animals, 150);
        assert_eq!(summary.failed_batch_indices, vec![1]);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_empty_summary() {
        let summary = LoadSummary::from_outcomes(&[]);
        assert!(summary.is_successful());
        assert_eq!(summary.success_rate(), 100.0);
    }

    #[test]
    fn test_success_rate() {
        let summary = LoadSummary::from_outcomes(&[
            BatchOutcome::loaded(0, 1),
            BatchOutcome::failed(1, 1, "x"),
            BatchOutcome::failed(2, 1, "x"),
            BatchOutcome::loaded(3, 1),
        ]);
        assert_eq!(summary.success_rate(), 50.0);
    }

    fn report() -> PipelineReport {
        PipelineReport {
            run_id: RunId::generate(),
            dry_run: false,
            listed_animals: 3,
            failed_detail_ids: vec![],
            transform_failures: TransformFailures::new(),
            skipped_conversions: 0,
            prepared_batches: 1,
            prepared_animals: 3,
            load: Some(LoadSummary::from_outcomes(&[BatchOutcome::loaded(0, 3)])),
            cleaned_files: 0,
            duration: Duration::from_millis(20),
        }
    }

    #[test]
    fn test_report_failures() {
        assert!(!report().has_failures());

        let mut with_detail_failure = report();
        with_detail_failure.failed_detail_ids.push(4);
        assert!(with_detail_failure.has_failures());

        let mut with_transform_failure = report();
        with_transform_failure
            .transform_failures
            .add(FailureCategory::ValidationError, RecordKey::Id(2));
        assert!(with_transform_failure.has_failures());

        let mut with_failed_batch = report();
        with_failed_batch.load = Some(LoadSummary::from_outcomes(&[BatchOutcome::failed(
            0, 3, "x",
        )]));
        assert!(with_failed_batch.has_failures());
    }
}
