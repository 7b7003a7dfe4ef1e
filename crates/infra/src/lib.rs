//! Infrastructure layer: storage engines, plan execution, batch ingestion.

pub mod aggregator;
pub mod catalog;
pub mod ingestion;
pub mod storage;

pub use aggregator::{SearchResult, execute};
pub use catalog::CatalogService;
pub use ingestion::{IngestConfig, IngestReport, IngestionCoordinator, UnitOutcome};
pub use storage::{InMemoryProductIndex, Neo4jConfig, Neo4jHttpIndex, ProductIndex};
