//! Catalog service: the single entry point used by transports.
//!
//! Wires the planner, the result aggregator and the ingestion coordinator
//! around one injected storage client. The service never opens or closes the
//! client; whoever built it owns its lifecycle.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use prodsearch_core::CatalogResult;
use prodsearch_products::{ImportRow, Product, products_from_rows};
use prodsearch_search::{SearchQuery, plan};

use crate::aggregator::{self, SearchResult};
use crate::ingestion::{IngestConfig, IngestReport, IngestionCoordinator};
use crate::storage::ProductIndex;

/// Price given to the first row of a bulk import; each later row gets one more.
pub const IMPORT_STARTING_PRICE: f64 = 1.0;

#[derive(Clone)]
pub struct CatalogService {
    index: Arc<dyn ProductIndex>,
    ingestion: IngestionCoordinator,
}

impl CatalogService {
    pub fn new(index: Arc<dyn ProductIndex>) -> Self {
        Self::with_ingest_config(index, IngestConfig::default())
    }

    pub fn with_ingest_config(index: Arc<dyn ProductIndex>, config: IngestConfig) -> Self {
        let ingestion = IngestionCoordinator::with_config(index.clone(), config);
        Self { index, ingestion }
    }

    /// Run the fallback plan for `query` and return the first non-empty result set.
    #[instrument(skip(self, query), fields(text = %query.text, threshold = %query.threshold))]
    pub async fn search(&self, query: &SearchQuery) -> CatalogResult<SearchResult> {
        if !query.threshold.is_in_range() {
            warn!("threshold outside (0, 1]; passing it to storage unchanged");
        }
        let result = aggregator::execute(plan(query), &*self.index).await?;
        debug!(
            hits = result.products.len(),
            matched_by = ?result.matched_by,
            attempts = result.attempts,
            "search finished"
        );
        Ok(result)
    }

    /// Normalize and persist a batch; one representative error on failure.
    pub async fn add_products(&self, products: Vec<Product>) -> CatalogResult<()> {
        self.ingestion.ingest(products).await
    }

    /// Normalize and persist a batch, reporting every product's outcome.
    pub async fn add_products_detailed(&self, products: Vec<Product>) -> IngestReport {
        self.ingestion.ingest_detailed(products).await
    }

    /// Ingest rows from the bulk-import reader, assigning incrementing prices.
    pub async fn import_rows(&self, rows: Vec<ImportRow>) -> CatalogResult<()> {
        let products = products_from_rows(rows, IMPORT_STARTING_PRICE);
        self.ingestion.ingest(products).await
    }
}

impl core::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CatalogService")
            .field("ingestion", &self.ingestion)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryProductIndex;
    use prodsearch_search::StrategyKind;

    fn service() -> (CatalogService, Arc<InMemoryProductIndex>) {
        let index = Arc::new(InMemoryProductIndex::new());
        (CatalogService::new(index.clone()), index)
    }

    #[tokio::test]
    async fn added_products_are_found_with_typos() {
        let (svc, _) = service();
        svc.add_products(vec![
            Product::new("1", "Leather Wallet", "Brown, slim", 30.0),
            Product::new("2", "Canvas Backpack", "Green", 55.0),
        ])
        .await
        .unwrap();

        let res = svc.search(&SearchQuery::new("walet", 0.7)).await.unwrap();
        assert_eq!(res.matched_by, Some(StrategyKind::Proximity));
        assert_eq!(res.products.len(), 1);
        assert_eq!(res.products[0].id.as_str(), "1");
    }

    #[tokio::test]
    async fn partial_words_fall_back_to_wildcard() {
        let (svc, _) = service();
        svc.add_products(vec![Product::new("1", "Backpack", "Canvas", 55.0)])
            .await
            .unwrap();

        // "back" is too far from "backpack" for 0.9 similarity but is a prefix.
        let res = svc.search(&SearchQuery::new("back", 0.9)).await.unwrap();
        assert_eq!(res.matched_by, Some(StrategyKind::TokenWildcard));
        assert_eq!(res.products[0].id.as_str(), "1");
    }

    #[tokio::test]
    async fn no_match_is_an_empty_success() {
        let (svc, _) = service();
        svc.add_products(vec![Product::new("1", "Backpack", "Canvas", 55.0)])
            .await
            .unwrap();

        let res = svc.search(&SearchQuery::new("zzzz", 0.9)).await.unwrap();
        assert!(res.products.is_empty());
        assert_eq!(res.attempts, 2);
    }

    #[tokio::test]
    async fn out_of_range_threshold_reaches_storage_unchanged() {
        let (svc, _) = service();
        svc.add_products(vec![Product::new("1", "Backpack", "Canvas", 55.0)])
            .await
            .unwrap();

        // Above 1 the in-memory engine reads the value as an edit distance.
        let query = SearchQuery::new("backpak", 2.0);
        assert!(!query.threshold.is_in_range());
        let res = svc.search(&query).await.unwrap();
        assert_eq!(res.matched_by, Some(StrategyKind::Proximity));
        assert_eq!(res.products[0].id.as_str(), "1");
    }

    #[tokio::test]
    async fn import_rows_assign_prices_and_ingest() {
        let (svc, index) = service();
        svc.import_rows(vec![
            ImportRow::new("a", "Apple", "Green"),
            ImportRow::new("b", "Banana", "Yellow"),
        ])
        .await
        .unwrap();

        let mut stored = index.products();
        stored.sort_by(|x, y| x.id.cmp(&y.id));
        assert_eq!(stored[0].price, IMPORT_STARTING_PRICE);
        assert_eq!(stored[1].price, IMPORT_STARTING_PRICE + 1.0);
    }
}
