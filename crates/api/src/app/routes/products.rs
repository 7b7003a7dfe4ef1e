use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use prodsearch_products::{ImportRow, Product};

use crate::app::{dto, errors, services::AppServices};

/// `POST /addProducts`: normalize and store a batch of products.
pub async fn add_products(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<Product>>, JsonRejection>,
) -> axum::response::Response {
    let Json(products) = match body {
        Ok(b) => b,
        Err(rej) => return errors::rejection_to_response(rej),
    };

    match services.catalog.add_products(products).await {
        Ok(()) => (StatusCode::CREATED, dto::PRODUCTS_ADDED).into_response(),
        Err(e) => {
            tracing::warn!("add products failed: {e}");
            errors::catalog_error_to_response(e)
        }
    }
}

/// `POST /addProducts/report`: like `/addProducts` but answers with every
/// product's outcome.
pub async fn add_products_report(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<Product>>, JsonRejection>,
) -> axum::response::Response {
    let Json(products) = match body {
        Ok(b) => b,
        Err(rej) => return errors::rejection_to_response(rej),
    };

    let report = services.catalog.add_products_detailed(products).await;
    let status = if report.is_success() {
        StatusCode::CREATED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report)).into_response()
}

/// `POST /importRows`: ingest rows handed over by the bulk-import reader.
pub async fn import_rows(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<ImportRow>>, JsonRejection>,
) -> axum::response::Response {
    let Json(rows) = match body {
        Ok(b) => b,
        Err(rej) => return errors::rejection_to_response(rej),
    };

    match services.catalog.import_rows(rows).await {
        Ok(()) => (StatusCode::CREATED, dto::PRODUCTS_ADDED).into_response(),
        Err(e) => {
            tracing::warn!("import failed: {e}");
            errors::catalog_error_to_response(e)
        }
    }
}
