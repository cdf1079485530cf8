//! Core pipeline logic.
//!
//! # Modules
//!
//! - [`transform`] - Record normalization and destination conversion
//! - [`batching`] - Fixed-size chunking for the destination's size limit
//! - [`pipeline`] - Extract, transform and load stages plus the run coordinator
//! - [`verification`] - Payload checksums between stages
//!
//! # Run Workflow
//!
//! 1. **Extract**: Page through the listing and store every item
//! 2. **Transform**: Fetch details in id chunks, normalize, convert and store
//!    load batches of at most 100 records
//! 3. **Load**: Post each batch, release its payload, count the outcome
//! 4. **Cleanup**: Remove anything the run left in the work directory
//!
//! # Example
//!
//! ```rust,no_run
//! use animal_etl::config::load_config;
//! use animal_etl::core::pipeline::Pipeline;
//! use animal_etl::domain::RunId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("animal-etl.toml")?;
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let report = pipeline.run(&RunId::generate()).await?;
//! if let Some(load) = &report.load {
//!     println!("Loaded: {}", load.total_animals);
//!     println!("Failed batches: {}", load.failed_batches);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batching;
pub mod pipeline;
pub mod transform;
pub mod verification;
