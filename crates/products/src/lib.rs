//! Products domain module.
//!
//! This crate contains the product record, the text normalization that feeds
//! the search index, and the mapping from bulk-import rows. It is purely
//! deterministic logic (no IO, no HTTP, no storage).

pub mod import;
pub mod product;
pub mod text;

pub use import::{ImportRow, products_from_rows};
pub use product::{IndexedProduct, Product};
pub use text::{SearchText, normalize};

pub use prodsearch_core::ProductId;
