//! Plan execution with short-circuit fallback.
//!
//! Strategies run in plan order. The first one that returns at least one row
//! wins and its rows are returned exactly as the engine ranked them; nothing
//! after it is built or sent. A storage error ends the search on the spot and
//! is never mistaken for "no results".

use serde::Serialize;
use tracing::debug;

use prodsearch_core::StorageError;
use prodsearch_products::Product;
use prodsearch_search::{ANALYZER, Plan, StrategyKind};

use crate::storage::ProductIndex;

/// Outcome of executing a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Matches in engine order. Empty when every strategy came back empty.
    pub products: Vec<Product>,
    /// The strategy that produced `products`, if any did.
    pub matched_by: Option<StrategyKind>,
    /// Number of strategies sent to the engine.
    pub attempts: usize,
}

impl SearchResult {
    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}

pub async fn execute<I>(plan: Plan, index: &I) -> Result<SearchResult, StorageError>
where
    I: ProductIndex + ?Sized,
{
    let mut attempts = 0;

    for strategy in plan {
        attempts += 1;
        debug!(strategy = %strategy.kind(), query = strategy.query(), "trying strategy");

        let products = index.similarity_search(strategy.query(), ANALYZER).await?;

        if !products.is_empty() {
            debug!(strategy = %strategy.kind(), hits = products.len(), "strategy matched");
            return Ok(SearchResult {
                products,
                matched_by: Some(strategy.kind()),
                attempts,
            });
        }
    }

    Ok(SearchResult {
        products: Vec::new(),
        matched_by: None,
        attempts,
    })
}
