use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use prodsearch_core::{CatalogError, StorageError};

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        CatalogError::MalformedInput(_) => {
            json_error(StatusCode::BAD_REQUEST, "malformed_input", message)
        }
        CatalogError::Storage(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, storage_code(&e), message)
        }
        CatalogError::PartialBatchFailure { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "partial_batch_failure", message)
        }
    }
}

/// Undecodable request body.
pub fn rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    catalog_error_to_response(CatalogError::malformed(rejection.body_text()))
}

fn storage_code(err: &StorageError) -> &'static str {
    match err {
        StorageError::Unavailable(_) => "storage_unavailable",
        StorageError::Query(_) => "storage_error",
        StorageError::RowDecode(_) => "row_decode_error",
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
