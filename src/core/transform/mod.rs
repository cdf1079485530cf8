//! Record transformation
//!
//! - [`timestamp`] resolves the many `born_at` encodings to one instant
//! - [`normalize`](normalize()) turns one raw record into a canonical record or a
//!   classified failure
//! - [`BatchTransformer`] applies that across collections and converts the
//!   results to the destination wire shape

pub mod batch;
pub mod normalize;
pub mod timestamp;

pub use batch::{BatchTransformer, TransformFailures, TransformOutcome};
pub use normalize::{
    normalize, FailureCategory, NormalizationError, NormalizationErrorKind,
};
