//! Extract → transform → load stages
//!
//! Each stage is a plain async function with an explicit input/output
//! contract, so an external scheduler can call them one by one. [`Pipeline`]
//! sequences them for a single run.
//!
//! - [`extract()`] stores the full listing and returns an [`ExtractOutput`]
//! - [`transform()`] turns it into stored load batches ([`TransformOutput`])
//! - [`load()`] posts each batch and returns a [`LoadSummary`]
//!
//! Payloads travel between stages through a [`BatchStore`].

pub mod coordinator;
pub mod extract;
pub mod load;
pub mod storage;
pub mod summary;
pub mod transform;

pub use coordinator::Pipeline;
pub use extract::{extract, ExtractOutput};
pub use load::{load, load_batch};
pub use storage::{BatchStore, StorageHandle};
pub use summary::{BatchOutcome, LoadSummary, PipelineReport};
pub use transform::{transform, BatchDescriptor, TransformOutput};
