//! Payload integrity checks between pipeline stages

pub mod checksum;

pub use checksum::{calculate_checksum_bytes, verify_checksum};
