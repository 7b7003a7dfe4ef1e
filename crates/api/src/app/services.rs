use std::sync::Arc;

use prodsearch_core::StorageError;
use prodsearch_infra::{CatalogService, InMemoryProductIndex, Neo4jHttpIndex, ProductIndex};

use crate::config::{ApiConfig, StorageBackend};

/// Everything handlers need, shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub default_threshold: f64,
}

impl AppServices {
    pub fn new(catalog: CatalogService, default_threshold: f64) -> Self {
        Self {
            catalog,
            default_threshold,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(config: &ApiConfig) -> Self {
        let index: Arc<dyn ProductIndex> = Arc::new(InMemoryProductIndex::new());
        Self::new(
            CatalogService::with_ingest_config(index, config.ingest.clone()),
            config.default_threshold,
        )
    }
}

/// Open the configured storage client and wire the catalog around it.
///
/// For Neo4j the server must answer before startup continues, and the
/// full-text index is created if it is missing.
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StorageError> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::info!("using in-memory product index");
            Ok(AppServices::in_memory(config))
        }
        StorageBackend::Neo4j => {
            tracing::info!(
                url = %config.neo4j.url,
                database = %config.neo4j.database,
                "using neo4j product index"
            );
            let neo4j = Neo4jHttpIndex::new(config.neo4j.clone())?;
            neo4j.ping().await?;
            neo4j.ensure_schema().await?;
            let index: Arc<dyn ProductIndex> = Arc::new(neo4j);
            Ok(AppServices::new(
                CatalogService::with_ingest_config(index, config.ingest.clone()),
                config.default_threshold,
            ))
        }
    }
}
