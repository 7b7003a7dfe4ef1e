use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use prodsearch_search::SearchQuery;

use crate::app::{dto::SearchRequest, errors, services::AppServices};

/// `POST /search`: run the fuzzy search plan and answer with the matching
/// products, possibly none.
pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rej) => return errors::rejection_to_response(rej),
    };

    let threshold = req.threshold.unwrap_or(services.default_threshold);
    let query = SearchQuery::new(req.query, threshold);

    match services.catalog.search(&query).await {
        Ok(result) => (StatusCode::OK, Json(result.into_products())).into_response(),
        Err(e) => {
            tracing::warn!("search failed: {e}");
            errors::catalog_error_to_response(e)
        }
    }
}
