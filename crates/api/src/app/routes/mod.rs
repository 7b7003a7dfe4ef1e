use axum::{Router, routing::post};

pub mod products;
pub mod search;
pub mod system;

/// Router for the catalog endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/addProducts", post(products::add_products))
        .route("/addProducts/report", post(products::add_products_report))
        .route("/importRows", post(products::import_rows))
        .route("/search", post(search::search))
}
