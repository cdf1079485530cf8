//! External system integrations.
//!
//! This module provides adapters for the animals API:
//!
//! - [`source`] - Paginated listing and per-id detail retrieval
//! - [`destination`] - Batch posting to the home endpoint
//! - [`traits`] - [`AnimalSource`] / [`AnimalSink`] seams used by the pipeline
//! - [`retry`] - Retry policy shared by both clients
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate `reqwest` from the
//! pipeline stages and enable testing with in-memory implementations.
//!
//! ```rust,no_run
//! use animal_etl::adapters::{DestinationClient, SourceClient};
//! use animal_etl::adapters::traits::AnimalSource;
//! use animal_etl::config::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let source = SourceClient::new(&config.api, &config.pipeline)?;
//! let destination = DestinationClient::new(&config.api)?;
//!
//! let healthy = source.health_check().await;
//! # Ok(())
//! # }
//! ```

pub mod destination;
mod http;
pub mod retry;
pub mod source;
pub mod traits;

pub use destination::DestinationClient;
pub use retry::RetryPolicy;
pub use source::SourceClient;
pub use traits::{AnimalSink, AnimalSource, PageResult};
