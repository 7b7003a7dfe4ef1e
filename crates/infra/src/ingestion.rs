//! Concurrent batch ingestion.
//!
//! ## Design
//!
//! - One task per product; no ordering between products
//! - Fan-out is unbounded unless `IngestConfig::max_in_flight` is set
//! - The batch waits for every task before deciding the outcome
//! - No rollback: products that were written stay written
//! - Dropping the `ingest` future aborts units still in flight
//!
//! `ingest` reports one representative error (the first failure to complete).
//! `ingest_detailed` reports every product's outcome for callers that need to
//! know exactly which ones failed.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use prodsearch_core::{CatalogError, ProductId, StorageError};
use prodsearch_products::Product;

use crate::storage::ProductIndex;

/// Ingestion tuning.
#[derive(Debug, Clone, Default)]
pub struct IngestConfig {
    /// Cap on concurrent writes per batch. `None` spawns every unit at once.
    pub max_in_flight: Option<NonZeroUsize>,
}

impl IngestConfig {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_in_flight(mut self, max: NonZeroUsize) -> Self {
        self.max_in_flight = Some(max);
        self
    }
}

/// Result of persisting one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitOutcome {
    pub product_id: ProductId,
    #[serde(serialize_with = "serialize_unit_result")]
    pub result: Result<(), StorageError>,
}

fn serialize_unit_result<S>(result: &Result<(), StorageError>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match result {
        Ok(()) => s.serialize_none(),
        Err(e) => s.serialize_some(&e.to_string()),
    }
}

/// Per-product outcomes of one batch, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub outcomes: Vec<UnitOutcome>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.total() - self.failed_count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// First failure in completion order.
    pub fn first_error(&self) -> Option<&StorageError> {
        self.failed().find_map(|o| o.result.as_ref().err())
    }

    /// Collapse to the single-error contract of [`IngestionCoordinator::ingest`].
    pub fn into_result(self) -> Result<(), CatalogError> {
        let failed = self.failed_count();
        match self.first_error() {
            None => Ok(()),
            Some(first) => Err(CatalogError::PartialBatchFailure {
                failed,
                total: self.total(),
                source: first.clone(),
            }),
        }
    }
}

/// Normalizes and persists product batches.
#[derive(Clone)]
pub struct IngestionCoordinator {
    index: Arc<dyn ProductIndex>,
    config: IngestConfig,
}

impl IngestionCoordinator {
    pub fn new(index: Arc<dyn ProductIndex>) -> Self {
        Self::with_config(index, IngestConfig::default())
    }

    pub fn with_config(index: Arc<dyn ProductIndex>, config: IngestConfig) -> Self {
        Self { index, config }
    }

    /// Persist every product; fail with one representative error if any write failed.
    pub async fn ingest(&self, products: Vec<Product>) -> Result<(), CatalogError> {
        self.ingest_detailed(products).await.into_result()
    }

    /// Persist every product and report each outcome.
    pub async fn ingest_detailed(&self, products: Vec<Product>) -> IngestReport {
        if products.is_empty() {
            return IngestReport::default();
        }

        let total = products.len();
        let limiter = self
            .config
            .max_in_flight
            .map(|n| Arc::new(Semaphore::new(n.get())));

        let mut units = JoinSet::new();
        for product in products {
            let index = Arc::clone(&self.index);
            let limiter = limiter.clone();
            units.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail.
                let _permit = match limiter {
                    Some(l) => l.acquire_owned().await.ok(),
                    None => None,
                };
                let indexed = product.index();
                let result = index.create_record(&indexed).await;
                UnitOutcome {
                    product_id: indexed.id().clone(),
                    result,
                }
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                // Only reachable if the set is aborted, which never happens while we hold it.
                Err(e) => warn!("ingest unit cancelled: {e}"),
            }
        }

        let report = IngestReport { outcomes };
        if report.is_success() {
            info!(total, "batch ingested");
        } else {
            warn!(
                total,
                failed = report.failed_count(),
                succeeded = report.succeeded_count(),
                first_error = ?report.first_error(),
                "batch ingested with failures"
            );
        }
        report
    }
}

impl core::fmt::Debug for IngestionCoordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IngestionCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use prodsearch_products::IndexedProduct;

    /// Records every write; fails the ones whose id is listed.
    #[derive(Default)]
    struct RecordingIndex {
        fail_ids: Vec<String>,
        calls: AtomicUsize,
        written: Mutex<Vec<IndexedProduct>>,
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
        delay: Option<Duration>,
    }

    impl RecordingIndex {
        fn failing(ids: &[&str]) -> Self {
            Self {
                fail_ids: ids.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl ProductIndex for RecordingIndex {
        async fn create_record(&self, product: &IndexedProduct) -> Result<(), StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Rejections come back at once; only accepted writes pay the delay.
            if self.fail_ids.iter().any(|id| id == product.id().as_str()) {
                return Err(StorageError::query(format!("rejected {}", product.id())));
            }

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);

            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.written.lock().unwrap().push(product.clone());
            Ok(())
        }

        async fn similarity_search(
            &self,
            _query: &str,
            _analyzer: &str,
        ) -> Result<Vec<Product>, StorageError> {
            panic!("ingestion must not search");
        }
    }

    fn batch(n: usize) -> Vec<Product> {
        (1..=n)
            .map(|i| Product::new(format!("p{i}"), format!("Item {i}"), "Some thing", i as f64))
            .collect()
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let index = Arc::new(RecordingIndex::default());
        let coordinator = IngestionCoordinator::new(index.clone());

        coordinator.ingest(vec![]).await.unwrap();
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_product_is_normalized_and_written() {
        let index = Arc::new(RecordingIndex::default());
        let coordinator = IngestionCoordinator::new(index.clone());

        coordinator.ingest(batch(3)).await.unwrap();

        let mut written = index.written.lock().unwrap().clone();
        written.sort_by(|a, b| a.id().cmp(b.id()));
        assert_eq!(written.len(), 3);
        assert_eq!(written[0].full_text_with_spaces(), "Item 1 Some thing");
        assert_eq!(written[0].full_text_without_spaces(), "Item1Something");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn one_failure_fails_the_batch_but_all_writes_are_attempted() {
        let index = Arc::new(RecordingIndex::failing(&["p2"]));
        let coordinator = IngestionCoordinator::new(index.clone());

        let err = coordinator.ingest(batch(3)).await.unwrap_err();

        assert_eq!(index.calls.load(Ordering::SeqCst), 3);
        assert_eq!(index.written.lock().unwrap().len(), 2);
        match err {
            CatalogError::PartialBatchFailure { failed, total, source } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
                assert_eq!(source, StorageError::query("rejected p2"));
            }
            other => panic!("expected PartialBatchFailure, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fast_failure_waits_for_slower_writes() {
        let index = Arc::new(RecordingIndex {
            fail_ids: vec!["p2".to_string()],
            delay: Some(Duration::from_millis(200)),
            ..RecordingIndex::default()
        });
        let coordinator = IngestionCoordinator::new(index.clone());

        let err = coordinator.ingest(batch(3)).await.unwrap_err();

        // p1 and p3 are still sleeping when p2 fails; both must have landed.
        let mut written: Vec<String> = index
            .written
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        written.sort();
        assert_eq!(written, vec!["p1", "p3"]);
        assert!(matches!(err, CatalogError::PartialBatchFailure { failed: 1, total: 3, .. }));
    }

    #[tokio::test]
    async fn detailed_report_names_failed_products() {
        let index = Arc::new(RecordingIndex::failing(&["p1", "p3"]));
        let coordinator = IngestionCoordinator::new(index.clone());

        let report = coordinator.ingest_detailed(batch(4)).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.succeeded_count(), 2);
        let mut failed: Vec<&str> = report.failed().map(|o| o.product_id.as_str()).collect();
        failed.sort();
        assert_eq!(failed, vec!["p1", "p3"]);
        assert!(report.first_error().is_some());
        assert!(!report.is_success());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn unbounded_fan_out_runs_units_concurrently() {
        let index = Arc::new(RecordingIndex::slow(Duration::from_millis(50)));
        let coordinator = IngestionCoordinator::new(index.clone());

        coordinator.ingest(batch(8)).await.unwrap();

        assert_eq!(index.calls.load(Ordering::SeqCst), 8);
        assert!(index.max_seen.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn max_in_flight_caps_concurrency() {
        let index = Arc::new(RecordingIndex::slow(Duration::from_millis(20)));
        let coordinator = IngestionCoordinator::with_config(
            index.clone(),
            IngestConfig::unbounded().with_max_in_flight(NonZeroUsize::new(2).unwrap()),
        );

        coordinator.ingest(batch(6)).await.unwrap();

        assert_eq!(index.calls.load(Ordering::SeqCst), 6);
        assert!(index.max_seen.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn cap_of_one_serializes_writes() {
        let index = Arc::new(RecordingIndex::slow(Duration::from_millis(10)));
        let coordinator = IngestionCoordinator::with_config(
            index.clone(),
            IngestConfig::unbounded().with_max_in_flight(NonZeroUsize::MIN),
        );

        coordinator.ingest(batch(4)).await.unwrap();

        assert_eq!(index.calls.load(Ordering::SeqCst), 4);
        assert_eq!(index.max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn report_serializes_errors_as_messages() {
        let report = IngestReport {
            outcomes: vec![
                UnitOutcome {
                    product_id: ProductId::new("a"),
                    result: Ok(()),
                },
                UnitOutcome {
                    product_id: ProductId::new("b"),
                    result: Err(StorageError::unavailable("down")),
                },
            ],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["result"], serde_json::Value::Null);
        assert_eq!(json["outcomes"][1]["result"], "storage unavailable: down");
    }
}
