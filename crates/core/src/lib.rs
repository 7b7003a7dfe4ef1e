//! `prodsearch-core`: shared building blocks for the catalog crates.
//!
//! This crate contains **pure** primitives (no IO, no async runtime).

pub mod error;
pub mod id;

pub use error::{CatalogError, CatalogResult, StorageError};
pub use id::ProductId;
