//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod health;
pub mod init;
pub mod run;
pub mod validate;
