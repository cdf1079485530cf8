//! Transform stage
//!
//! Consumes the stored listing, fetches details in id chunks, normalizes
//! them and writes destination-ready load batches of at most
//! [`DESTINATION_BATCH_LIMIT`] records.

use super::extract::ExtractOutput;
use super::storage::{batch_file_name, BatchStore, StorageHandle};
use crate::adapters::traits::AnimalSource;
use crate::config::DESTINATION_BATCH_LIMIT;
use crate::core::batching::{split, Batch};
use crate::core::transform::{BatchTransformer, TransformFailures};
use crate::domain::{ListingAnimal, Result, RunId};
use crate::{log_batch_processing, log_stage_complete, log_stage_start};
use std::time::Instant;

/// One stored load batch
#[derive(Debug)]
pub struct BatchDescriptor {
    pub handle: StorageHandle,

    /// Records in the batch
    pub count: usize,

    pub batch_index: usize,

    /// SHA-256 of the stored payload
    pub checksum: String,
}

/// Handoff from transform to load
#[derive(Debug)]
pub struct TransformOutput {
    /// Load batches in index order
    pub batches: Vec<BatchDescriptor>,

    /// Records that normalized successfully
    pub total_animals: usize,

    pub failures: TransformFailures,

    /// Ids whose detail fetch failed
    pub failed_detail_ids: Vec<u64>,

    /// Records dropped during destination conversion
    pub skipped_conversions: usize,
}

impl TransformOutput {
    /// Records written into load batches
    pub fn prepared_animals(&self) -> usize {
        self.batches.iter().map(|b| b.count).sum()
    }
}

/// Run the transform stage
///
/// The listing payload is released once every load batch is written.
///
/// # Errors
///
/// Fails if the listing payload is missing or corrupt, if `batch_size` is
/// zero, or if a load batch cannot be written. Per-id and per-record
/// failures are counted in the output instead.
pub async fn transform(
    run_id: &RunId,
    source: &dyn AnimalSource,
    store: &BatchStore,
    extracted: ExtractOutput,
    batch_size: usize,
) -> Result<TransformOutput> {
    log_stage_start!("transform", run_id);
    let started = Instant::now();

    let listing: Vec<ListingAnimal> = store.read_json(&extracted.handle)?;
    if listing.len() != extracted.total_animals {
        tracing::warn!(
            expected = extracted.total_animals,
            found = listing.len(),
            "Listing size differs from extract output"
        );
    }

    let ids: Vec<u64> = listing.iter().map(|animal| animal.id).collect();
    let id_chunks = split(ids, batch_size)?;
    let chunk_count = id_chunks.len();

    let mut output = TransformOutput {
        batches: Vec::new(),
        total_animals: 0,
        failures: TransformFailures::new(),
        failed_detail_ids: Vec::new(),
        skipped_conversions: 0,
    };

    let mut records_seen = 0;

    for (chunk_number, chunk) in id_chunks.iter().enumerate() {
        log_batch_processing!(chunk_number + 1, chunk_count);

        let (details, failed_ids) = source.fetch_details_batch(chunk).await;
        output.failed_detail_ids.extend(failed_ids);

        let outcome = BatchTransformer::transform_batch_at(&details, records_seen);
        records_seen += details.len();
        output.total_animals += outcome.animals.len();
        output.failures.merge(outcome.failures);

        let (converted, skipped) = BatchTransformer::to_destination_format(&outcome.animals);
        output.skipped_conversions += skipped;

        for batch in Batch::from_records(converted, DESTINATION_BATCH_LIMIT, output.batches.len())? {
            let name = batch_file_name(batch.batch_index(), run_id);
            let (handle, checksum) = store.write_json(&name, batch.animals())?;

            output.batches.push(BatchDescriptor {
                handle,
                count: batch.len(),
                batch_index: batch.batch_index(),
                checksum,
            });
        }

        tracing::info!(
            processed = output.total_animals,
            total = listing.len(),
            "Processed animals so far"
        );
    }

    store.release(extracted.handle);

    tracing::info!(
        animals = output.total_animals,
        batches = output.batches.len(),
        failed_details = output.failed_detail_ids.len(),
        failed_records = output.failures.total(),
        "Transformed animals into load batches"
    );
    log_stage_complete!("transform", output.total_animals, started.elapsed());

    Ok(output)
}
