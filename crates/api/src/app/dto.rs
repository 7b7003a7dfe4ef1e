use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Similarity threshold; the configured default applies when absent.
    #[serde(default)]
    pub threshold: Option<f64>,
}

// Products are decoded straight into `prodsearch_products::Product` and import
// rows into `prodsearch_products::ImportRow`; their wire shape is the domain
// type's serde shape.

pub const PRODUCTS_ADDED: &str = "Products added successfully";
