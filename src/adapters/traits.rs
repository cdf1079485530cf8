//! Source and sink traits
//!
//! Pipeline stages talk to the animals API only through these traits, so the
//! HTTP clients can be swapped for in-memory implementations in tests.

use crate::domain::{DestinationAnimal, ListingAnimal, RawAnimal, Result};
use async_trait::async_trait;

/// One fetched listing page
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Listing items that parsed, in page order
    pub items: Vec<ListingAnimal>,

    /// Page number reported by the server
    pub page: u32,

    /// Total number of pages reported by the server
    pub total_pages: u32,

    /// Items that failed listing-shape parsing and were dropped
    pub dropped_items: usize,
}

impl PageResult {
    /// Whether another page follows this one
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Read side of the animals API
#[async_trait]
pub trait AnimalSource: Send + Sync {
    /// Fetch one listing page (1-based)
    ///
    /// Transient failures are retried; other 4xx responses fail immediately.
    async fn fetch_page(&self, page: u32) -> Result<PageResult>;

    /// Fetch every listing page
    ///
    /// Stops when the server reports no next page, a page comes back empty, or
    /// the page ceiling is reached. Any page failure aborts the extraction.
    async fn fetch_all_listings(&self) -> Result<Vec<ListingAnimal>>;

    /// Fetch the detail record of one animal
    async fn fetch_detail(&self, id: u64) -> Result<RawAnimal>;

    /// Fetch detail records one after another
    ///
    /// Returns the records that were fetched and the ids that failed; a
    /// failed id never stops the remaining fetches.
    async fn fetch_details_batch(&self, ids: &[u64]) -> (Vec<RawAnimal>, Vec<u64>);

    /// Check whether the source answers; never fails
    async fn health_check(&self) -> bool;
}

/// Write side of the animals API
#[async_trait]
pub trait AnimalSink: Send + Sync {
    /// Post one batch of destination records
    ///
    /// Returns `Ok(true)` on a 2xx response and `Ok(false)` if the batch
    /// could not be serialized. Oversized batches and unretryable API
    /// failures are returned as errors.
    async fn send_batch(&self, animals: &[DestinationAnimal]) -> Result<bool>;

    /// Check whether the destination answers; never fails
    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, total_pages: u32) -> PageResult {
        PageResult {
            items: Vec::new(),
            page,
            total_pages,
            dropped_items: 0,
        }
    }

    #[test]
    fn test_has_next() {
        assert!(page(1, 3).has_next());
        assert!(page(2, 3).has_next());
        assert!(!page(3, 3).has_next());
        assert!(!page(4, 3).has_next());
    }
}
