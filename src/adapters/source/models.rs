//! Wire models for the source API

use crate::adapters::traits::PageResult;
use crate::domain::ListingAnimal;
use serde::Deserialize;
use serde_json::Value;

/// Listing page body as sent by the server
///
/// Items are kept as raw JSON so that one malformed item does not fail the
/// whole page. A missing `page` or `total_pages` is read as 1.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub items: Vec<Value>,

    #[serde(default = "first_page")]
    pub page: u32,

    #[serde(default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl ListingPage {
    /// Parse every item into the listing shape, dropping those that fail
    pub fn into_page_result(self) -> PageResult {
        let total = self.items.len();
        let mut items = Vec::with_capacity(total);

        for (position, raw) in self.items.into_iter().enumerate() {
            match serde_json::from_value::<ListingAnimal>(raw) {
                Ok(animal) => items.push(animal),
                Err(e) => {
                    tracing::warn!(
                        page = self.page,
                        position = position,
                        error = %e,
                        "Dropping listing item that failed to parse"
                    );
                }
            }
        }

        let dropped_items = total - items.len();

        PageResult {
            items,
            page: self.page,
            total_pages: self.total_pages,
            dropped_items,
        }
    }
}
