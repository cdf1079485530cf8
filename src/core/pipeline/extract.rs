//! Extract stage
//!
//! Reads the full paginated listing and stores it for the transform stage.

use super::storage::{listing_file_name, BatchStore, StorageHandle};
use crate::adapters::traits::AnimalSource;
use crate::domain::{Result, RunId};
use crate::{log_stage_complete, log_stage_start};
use std::time::Instant;

/// Handoff from extract to transform
#[derive(Debug)]
pub struct ExtractOutput {
    /// Stored listing collection
    pub handle: StorageHandle,

    pub total_animals: usize,
}

/// Run the extract stage
///
/// All-or-nothing: any listing page failure aborts the stage and nothing is
/// stored.
pub async fn extract(
    run_id: &RunId,
    source: &dyn AnimalSource,
    store: &BatchStore,
) -> Result<ExtractOutput> {
    log_stage_start!("extract", run_id);
    let started = Instant::now();

    let animals = source.fetch_all_listings().await?;
    let (handle, _) = store.write_json(&listing_file_name(run_id), &animals)?;

    tracing::info!(
        total = animals.len(),
        path = %handle,
        "Extracted animals"
    );
    log_stage_complete!("extract", animals.len(), started.elapsed());

    Ok(ExtractOutput {
        handle,
        total_animals: animals.len(),
    })
}
