//! Load stage
//!
//! Posts every stored batch to the destination. A batch is attempted once
//! per stage invocation; whatever happens, its payload is released
//! afterwards and the outcome is counted. The stage never fails as a whole.

use super::storage::{decode, BatchStore, StorageHandle};
use super::summary::{BatchOutcome, LoadSummary};
use super::transform::BatchDescriptor;
use crate::adapters::traits::AnimalSink;
use crate::core::verification::verify_checksum;
use crate::domain::{DestinationAnimal, EtlError, Result};
use crate::{log_batch_processing, log_stage_complete};
use std::time::Instant;

/// Load one stored batch and release its payload
pub async fn load_batch(
    sink: &dyn AnimalSink,
    store: &BatchStore,
    descriptor: BatchDescriptor,
) -> BatchOutcome {
    let BatchDescriptor {
        handle,
        count,
        batch_index,
        checksum,
    } = descriptor;

    let result = send_stored_batch(sink, store, &handle, &checksum).await;
    store.release(handle);

    match result {
        Ok(sent) => {
            if sent != count {
                tracing::warn!(
                    batch_index = batch_index,
                    expected = count,
                    sent = sent,
                    "Batch size differs from its descriptor"
                );
            }
            tracing::info!(batch_index = batch_index, animals = sent, "Loaded batch");
            BatchOutcome::loaded(batch_index, sent)
        }
        Err(e) => {
            tracing::error!(batch_index = batch_index, error = %e, "Failed to load batch");
            BatchOutcome::failed(batch_index, count, e.to_string())
        }
    }
}

async fn send_stored_batch(
    sink: &dyn AnimalSink,
    store: &BatchStore,
    handle: &StorageHandle,
    checksum: &str,
) -> Result<usize> {
    let bytes = store.read_bytes(handle)?;
    if !verify_checksum(&bytes, checksum) {
        return Err(EtlError::StorageIo(format!(
            "Payload {handle} failed checksum verification"
        )));
    }

    let animals: Vec<DestinationAnimal> = decode(handle, &bytes)?;
    if animals.is_empty() {
        return Err(EtlError::Validation("Batch contains no animals".to_string()));
    }

    if sink.send_batch(&animals).await? {
        Ok(animals.len())
    } else {
        Err(EtlError::Serialization(
            "Batch could not be serialized for the destination".to_string(),
        ))
    }
}

/// Load every batch in order and summarize
pub async fn load(
    sink: &dyn AnimalSink,
    store: &BatchStore,
    batches: Vec<BatchDescriptor>,
) -> LoadSummary {
    let started = Instant::now();
    let total = batches.len();
    tracing::info!(stage = "load", batches = total, "Starting stage");

    let mut outcomes = Vec::with_capacity(total);
    for (position, descriptor) in batches.into_iter().enumerate() {
        log_batch_processing!(position + 1, total);
        outcomes.push(load_batch(sink, store, descriptor).await);
    }

    let summary = LoadSummary::from_outcomes(&outcomes);
    if !summary.is_successful() {
        tracing::warn!(
            failed = summary.failed_batches,
            failed_batches = ?summary.failed_batch_indices,
            "Some batches were not loaded"
        );
    }
    log_stage_complete!("load", summary.total_animals, started.elapsed());

    summary
}
