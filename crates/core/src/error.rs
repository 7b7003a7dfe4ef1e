//! Error model shared by the search and ingestion paths.

use thiserror::Error;

/// Result type used across the catalog layer.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure reported by the storage collaborator.
///
/// The core never retries; any of these aborts the operation that hit it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The engine could not be reached (connection refused, timeout, etc.).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The engine rejected or failed to run a request.
    #[error("storage query failed: {0}")]
    Query(String),

    /// A returned row did not have the expected shape.
    #[error("unexpected row shape: {0}")]
    RowDecode(String),
}

impl StorageError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn row_decode(msg: impl Into<String>) -> Self {
        Self::RowDecode(msg.into())
    }
}

/// Catalog-level error surfaced to callers of search and ingestion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The request could not be decoded into the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A single storage call failed (search or single-record write).
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// At least one unit of an ingestion batch failed.
    ///
    /// `source` is one representative failure; which one is not deterministic
    /// under concurrent completion. Successful writes are not rolled back.
    #[error("{failed} of {total} products failed to persist: {source}")]
    PartialBatchFailure {
        failed: usize,
        total: usize,
        #[source]
        source: StorageError,
    },
}

impl CatalogError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_batch_failure_message_carries_underlying_error() {
        let err = CatalogError::PartialBatchFailure {
            failed: 1,
            total: 3,
            source: StorageError::query("constraint violated"),
        };
        let msg = err.to_string();
        assert!(msg.contains("1 of 3"));
        assert!(msg.contains("constraint violated"));
    }

    #[test]
    fn storage_error_converts_transparently() {
        let err: CatalogError = StorageError::unavailable("connection refused").into();
        assert_eq!(err.to_string(), "storage unavailable: connection refused");
        assert!(matches!(err, CatalogError::Storage(StorageError::Unavailable(_))));
    }

    #[test]
    fn malformed_input_has_no_source() {
        let err = CatalogError::malformed("expected array");
        assert_eq!(err.to_string(), "malformed input: expected array");
        assert!(std::error::Error::source(&err).is_none());
    }
}
