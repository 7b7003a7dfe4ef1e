//! Storage engine boundary.
//!
//! `ProductIndex` is what the catalog needs from a full-text engine. Two
//! adapters ship here: an in-memory engine for tests/dev and a Neo4j adapter
//! speaking the HTTP transactional Cypher API.

pub mod in_memory;
pub mod neo4j;
pub mod r#trait;

pub use in_memory::InMemoryProductIndex;
pub use neo4j::{Neo4jConfig, Neo4jHttpIndex};
pub use r#trait::ProductIndex;
