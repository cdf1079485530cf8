//! Animals source API adapter
//!
//! Paginated listing (`GET /v1/animals?page=N`) and per-id detail
//! (`GET /v1/animals/{id}`) retrieval with retry.

pub mod client;
pub mod models;

pub use client::SourceClient;
pub use models::ListingPage;
