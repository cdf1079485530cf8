//! Fixed-size chunking
//!
//! Splits record sequences into chunks no larger than a limit. Order is
//! preserved across and within chunks, and no item is lost or duplicated.

use crate::domain::{DestinationAnimal, EtlError, Result};
use serde::{Deserialize, Serialize};

/// Split `items` into chunks of at most `max_size`
///
/// # Errors
///
/// Returns [`EtlError::Validation`] when `max_size` is zero.
///
/// # Examples
///
/// ```
/// use animal_etl::core::batching::split;
///
/// let chunks = split((1..=250).collect::<Vec<_>>(), 100).unwrap();
/// let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
/// assert_eq!(sizes, vec![100, 100, 50]);
/// ```
pub fn split<T>(items: Vec<T>, max_size: usize) -> Result<Vec<Vec<T>>> {
    if max_size == 0 {
        return Err(EtlError::Validation(
            "Chunk size must be greater than 0".to_string(),
        ));
    }

    let mut chunks = Vec::with_capacity(items.len().div_ceil(max_size));
    let mut iter = items.into_iter().peekable();

    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(max_size).collect());
    }

    Ok(chunks)
}

/// Immutable, size-bounded group of destination records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    batch_index: usize,
    animals: Vec<DestinationAnimal>,
}

// `from_records` never yields an empty batch
#[allow(clippy::len_without_is_empty)]
impl Batch {
    /// Split `records` into batches numbered from `first_index`
    pub fn from_records(
        records: Vec<DestinationAnimal>,
        max_size: usize,
        first_index: usize,
    ) -> Result<Vec<Batch>> {
        Ok(split(records, max_size)?
            .into_iter()
            .enumerate()
            .map(|(offset, animals)| Batch {
                batch_index: first_index + offset,
                animals,
            })
            .collect())
    }

    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    pub fn animals(&self) -> &[DestinationAnimal] {
        &self.animals
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }
}
