// Animal ETL - Animals API ETL Pipeline
// Copyright (c) 2025 Animal ETL Contributors
// Licensed under the MIT License

//! # Animal ETL
//!
//! Moves animal records from a paginated listing/detail API to a batch
//! ingestion endpoint.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Extracting** every listing item across pages, with retries on transient failures
//! - **Transforming** detail records: friends to arrays, timestamps to ISO 8601
//! - **Loading** records in batches of at most 100 into `POST /v1/home`
//! - **Reporting** per-record, per-id and per-batch failures without aborting the run
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (transform, batching, pipeline stages, verification)
//! - [`adapters`] - HTTP clients for the source and destination, retry policy
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use animal_etl::config::load_config;
//! use animal_etl::core::pipeline::Pipeline;
//! use animal_etl::domain::RunId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("animal-etl.toml")?;
//!     let pipeline = Pipeline::from_config(&config)?;
//!
//!     let report = pipeline.run(&RunId::generate()).await?;
//!     println!("Prepared {} animals", report.prepared_animals);
//!     Ok(())
//! }
//! ```
//!
//! ## Normalization
//!
//! Record-level rules are pure functions and can be used on their own:
//!
//! ```rust
//! use animal_etl::core::transform::normalize;
//! use animal_etl::domain::RawAnimal;
//! use serde_json::json;
//!
//! let raw = RawAnimal::new(1, "Rex")
//!     .with_friends(json!("Bella, Max"))
//!     .with_born_at(json!(1700000000000_i64));
//!
//! let animal = normalize(&raw).unwrap();
//! assert_eq!(animal.friends, vec!["Bella", "Max"]);
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], an alias over
//! [`domain::EtlError`]. Per-record problems are reported as values and never
//! abort a stage.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
