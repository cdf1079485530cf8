//! Animals destination API adapter
//!
//! Posts batches of destination records to `POST /v1/home`.

pub mod client;

pub use client::DestinationClient;
