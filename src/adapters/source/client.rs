//! HTTP client for the animals source API

use super::models::ListingPage;
use crate::adapters::http::{build_client, check_status, endpoint, read_body, transport_error};
use crate::adapters::retry::RetryPolicy;
use crate::adapters::traits::{AnimalSource, PageResult};
use crate::config::{ApiConfig, PipelineConfig};
use crate::domain::{ApiError, EtlError, ListingAnimal, RawAnimal, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Source API client
///
/// Every request is awaited before the next one starts.
///
/// # Example
///
/// ```no_run
/// use animal_etl::adapters::source::SourceClient;
/// use animal_etl::adapters::traits::AnimalSource;
/// use animal_etl::config::AppConfig;
///
/// # async fn example() -> animal_etl::domain::Result<()> {
/// let config = AppConfig::default();
/// let source = SourceClient::new(&config.api, &config.pipeline)?;
///
/// let listings = source.fetch_all_listings().await?;
/// println!("{} animals listed", listings.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SourceClient {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
    health_check_timeout: Duration,
    max_pages: u32,
}

impl SourceClient {
    /// Create a client from the API and pipeline configuration
    pub fn new(api: &ApiConfig, pipeline: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            base_url: api.base_url.clone(),
            client: build_client(api.timeout())?,
            retry: api.retry.policy(),
            health_check_timeout: api.health_check_timeout(),
            max_pages: pipeline.max_pages,
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the page ceiling
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    async fn get_page_once(&self, url: &str, page: u32) -> Result<PageResult> {
        let response = self
            .client
            .get(url)
            .query(&[("page", page)])
            .send()
            .await
            .map_err(transport_error)?;

        let bytes = read_body(check_status(response).await?).await?;

        let body: ListingPage = serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::InvalidResponse(format!("Listing page {page} is not a valid page: {e}"))
        })?;

        Ok(body.into_page_result())
    }

    async fn get_detail_once(&self, url: &str, id: u64) -> Result<RawAnimal> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let bytes = read_body(check_status(response).await?).await?;

        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::InvalidResponse(format!("Animal {id} detail is not valid JSON: {e}"))
        })?;

        if !body.is_object() {
            return Err(ApiError::InvalidResponse(format!(
                "Animal {id} detail is not a JSON object"
            ))
            .into());
        }

        serde_json::from_value(body).map_err(|e| {
            ApiError::InvalidResponse(format!("Animal {id} detail has an unexpected shape: {e}"))
                .into()
        })
    }
}

#[async_trait]
impl AnimalSource for SourceClient {
    async fn fetch_page(&self, page: u32) -> Result<PageResult> {
        if page == 0 {
            return Err(EtlError::Validation(
                "Page numbers start at 1".to_string(),
            ));
        }

        tracing::debug!(page = page, "Fetching animals page");

        let url = endpoint(&self.base_url, "/v1/animals");
        let result = self
            .retry
            .execute("fetch_page", || self.get_page_once(&url, page))
            .await?;

        if result.dropped_items > 0 {
            tracing::warn!(
                page = page,
                dropped = result.dropped_items,
                "Listing page contained unparseable items"
            );
        }

        Ok(result)
    }

    async fn fetch_all_listings(&self) -> Result<Vec<ListingAnimal>> {
        tracing::info!("Fetching all animal listings");

        let mut all_animals = Vec::new();
        let mut page = 1;

        loop {
            let result = self.fetch_page(page).await.map_err(|e| {
                tracing::error!(page = page, error = %e, "Failed to fetch animals page");
                EtlError::Extraction(format!("Failed to fetch animals page {page}: {e}"))
            })?;

            let page_count = result.items.len();
            let has_next = result.has_next();
            all_animals.extend(result.items);

            tracing::info!(
                page = page,
                count = page_count,
                total_pages = result.total_pages,
                "Fetched animals page"
            );

            if !has_next || page_count == 0 {
                break;
            }

            if page >= self.max_pages {
                tracing::warn!(
                    max_pages = self.max_pages,
                    "Reached maximum page limit, stopping pagination"
                );
                break;
            }

            page += 1;
        }

        tracing::info!(total = all_animals.len(), "Completed fetching all animals");
        Ok(all_animals)
    }

    async fn fetch_detail(&self, id: u64) -> Result<RawAnimal> {
        let url = endpoint(&self.base_url, &format!("/v1/animals/{id}"));
        self.retry
            .execute("fetch_detail", || self.get_detail_once(&url, id))
            .await
    }

    async fn fetch_details_batch(&self, ids: &[u64]) -> (Vec<RawAnimal>, Vec<u64>) {
        tracing::info!(count = ids.len(), "Fetching animal details");

        let mut animals = Vec::with_capacity(ids.len());
        let mut failed_ids = Vec::new();

        for &id in ids {
            match self.fetch_detail(id).await {
                Ok(animal) => animals.push(animal),
                Err(e) => {
                    tracing::error!(animal_id = id, error = %e, "Failed to fetch animal detail");
                    failed_ids.push(id);
                }
            }
        }

        if !failed_ids.is_empty() {
            tracing::warn!(
                failed = failed_ids.len(),
                failed_ids = ?failed_ids,
                "Some animal details could not be fetched"
            );
        }

        (animals, failed_ids)
    }

    async fn health_check(&self) -> bool {
        let url = endpoint(&self.base_url, "/v1/animals");
        let result = self
            .client
            .get(&url)
            .query(&[("page", 1)])
            .timeout(self.health_check_timeout)
            .send()
            .await;

        match result {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!(error = %e, "Source health check failed");
                false
            }
        }
    }
}
