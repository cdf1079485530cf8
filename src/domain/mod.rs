//! Domain models and types for the pipeline.
//!
//! The domain layer provides:
//! - **Record shapes** ([`ListingAnimal`], [`RawAnimal`], [`NormalizedAnimal`], [`DestinationAnimal`])
//! - **Identifiers** ([`RunId`], [`RecordKey`])
//! - **Error types** ([`EtlError`], [`ApiError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, EtlError>`]:
//!
//! ```rust
//! use animal_etl::domain::{EtlError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = animal_etl::config::load_config("animal-etl.toml")?;
//!     Ok(())
//! }
//! ```

pub mod animal;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use animal::{DestinationAnimal, ListingAnimal, NormalizedAnimal, RawAnimal, UNKNOWN_SPECIES};
pub use errors::{ApiError, EtlError};
pub use ids::{RecordKey, RunId};
pub use result::Result;
