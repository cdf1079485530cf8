//! Pipeline coordinator - sequences extract, transform and load
//!
//! The coordinator owns the source, sink and store for a run and threads
//! the run id explicitly through every stage. Intermediate files of the run
//! are removed once the run ends, whether it succeeded or not.

use super::extract::extract;
use super::load::load;
use super::storage::BatchStore;
use super::summary::PipelineReport;
use super::transform::transform;
use crate::adapters::traits::{AnimalSink, AnimalSource};
use crate::adapters::{DestinationClient, SourceClient};
use crate::config::AppConfig;
use crate::domain::{Result, RunId};
use std::sync::Arc;
use std::time::Instant;

/// Extract → transform → load driver
pub struct Pipeline {
    source: Arc<dyn AnimalSource>,
    sink: Arc<dyn AnimalSink>,
    store: BatchStore,
    batch_size: usize,
    dry_run: bool,
}

impl Pipeline {
    /// Create a pipeline from its parts
    pub fn new(
        source: Arc<dyn AnimalSource>,
        sink: Arc<dyn AnimalSink>,
        store: BatchStore,
        batch_size: usize,
    ) -> Self {
        Self {
            source,
            sink,
            store,
            batch_size,
            dry_run: false,
        }
    }

    /// Create a pipeline talking HTTP to the configured API
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use animal_etl::config::load_config;
    /// use animal_etl::core::pipeline::Pipeline;
    /// use animal_etl::domain::RunId;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config("animal-etl.toml")?;
    /// let pipeline = Pipeline::from_config(&config)?;
    ///
    /// let report = pipeline.run(&RunId::generate()).await?;
    /// report.log_summary();
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let source = SourceClient::new(&config.api, &config.pipeline)?;
        let sink = DestinationClient::new(&config.api)?;
        let store = BatchStore::new(&config.pipeline.work_dir)?;

        Ok(Self::new(
            Arc::new(source),
            Arc::new(sink),
            store,
            config.pipeline.batch_size,
        )
        .with_dry_run(config.application.dry_run))
    }

    /// Skip the load stage
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    /// Check the source and the destination
    ///
    /// Returns `(source_healthy, destination_healthy)`.
    pub async fn health_check(&self) -> (bool, bool) {
        let source = self.source.health_check().await;
        let destination = self.sink.health_check().await;
        (source, destination)
    }

    /// Execute one full run
    ///
    /// # Errors
    ///
    /// Fails only when extraction fails or the transform stage cannot read
    /// its input or write its output. Per-record and per-batch failures are
    /// reported in the returned [`PipelineReport`].
    pub async fn run(&self, run_id: &RunId) -> Result<PipelineReport> {
        let started = Instant::now();
        tracing::info!(run_id = %run_id, dry_run = self.dry_run, "Starting pipeline run");

        let result = self.run_stages(run_id, started).await;
        let cleaned_files = self.store.cleanup_run(run_id);

        match result {
            Ok(mut report) => {
                report.cleaned_files = cleaned_files;
                report.duration = started.elapsed();
                report.log_summary();
                Ok(report)
            }
            Err(e) => {
                tracing::error!(run_id = %run_id, error = %e, "Pipeline run failed");
                Err(e)
            }
        }
    }

    async fn run_stages(&self, run_id: &RunId, started: Instant) -> Result<PipelineReport> {
        let extracted = extract(run_id, self.source.as_ref(), &self.store).await?;
        let listed_animals = extracted.total_animals;

        let transformed = transform(
            run_id,
            self.source.as_ref(),
            &self.store,
            extracted,
            self.batch_size,
        )
        .await?;

        let prepared_batches = transformed.batches.len();
        let prepared_animals = transformed.prepared_animals();

        let load_summary = if self.dry_run {
            tracing::info!(
                batches = prepared_batches,
                animals = prepared_animals,
                "Dry run: skipping load stage"
            );
            for descriptor in transformed.batches {
                tracing::debug!(
                    batch_index = descriptor.batch_index,
                    count = descriptor.count,
                    "Would send batch"
                );
                self.store.release(descriptor.handle);
            }
            None
        } else {
            Some(load(self.sink.as_ref(), &self.store, transformed.batches).await)
        };

        Ok(PipelineReport {
            run_id: run_id.clone(),
            dry_run: self.dry_run,
            listed_animals,
            failed_detail_ids: transformed.failed_detail_ids,
            transform_failures: transformed.failures,
            skipped_conversions: transformed.skipped_conversions,
            prepared_batches,
            prepared_animals,
            load: load_summary,
            cleaned_files: 0,
            duration: started.elapsed(),
        })
    }
}
