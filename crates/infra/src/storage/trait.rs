use std::sync::Arc;

use prodsearch_core::StorageError;
use prodsearch_products::{IndexedProduct, Product};

/// The full-text storage engine behind the catalog.
///
/// The engine owns similarity scoring and ranking. The catalog only decides
/// which query strings to send and in what order.
///
/// ## Contract
///
/// - `create_record` persists one product together with its derived search
///   text. Implementations must tolerate concurrent calls from many tasks.
/// - `similarity_search` runs a query string verbatim, using the named
///   analyzer, and returns matches best-first. The catalog never re-sorts.
/// - Result rows that do not decode into a [`Product`] are reported as
///   [`StorageError::RowDecode`], not skipped.
#[async_trait::async_trait]
pub trait ProductIndex: Send + Sync {
    async fn create_record(&self, product: &IndexedProduct) -> Result<(), StorageError>;

    async fn similarity_search(
        &self,
        query: &str,
        analyzer: &str,
    ) -> Result<Vec<Product>, StorageError>;
}

#[async_trait::async_trait]
impl<S> ProductIndex for Arc<S>
where
    S: ProductIndex + ?Sized,
{
    async fn create_record(&self, product: &IndexedProduct) -> Result<(), StorageError> {
        (**self).create_record(product).await
    }

    async fn similarity_search(
        &self,
        query: &str,
        analyzer: &str,
    ) -> Result<Vec<Product>, StorageError> {
        (**self).similarity_search(query, analyzer).await
    }
}
