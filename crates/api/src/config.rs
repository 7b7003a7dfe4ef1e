//! Process configuration read from the environment at startup.

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::time::Duration;

use thiserror::Error;

use prodsearch_infra::{IngestConfig, Neo4jConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9090";
const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Which storage engine backs the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process engine; data is lost on restart.
    Memory,
    Neo4j,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub neo4j: Neo4jConfig,
    /// Used when a search request leaves `threshold` out.
    pub default_threshold: f64,
    pub ingest: IngestConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            storage: StorageBackend::Memory,
            neo4j: Neo4jConfig::default(),
            default_threshold: DEFAULT_THRESHOLD,
            ingest: IngestConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (env-like key → value).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let storage = match lookup("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => StorageBackend::Memory,
            Some("neo4j") => StorageBackend::Neo4j,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "STORAGE_BACKEND",
                    format!("expected memory or neo4j, got {other:?}"),
                ));
            }
        };

        let defaults = Neo4jConfig::default();
        let password = match lookup("NEO4J_PASSWORD") {
            Some(p) => p,
            None => {
                if storage == StorageBackend::Neo4j {
                    tracing::warn!("NEO4J_PASSWORD not set; using empty password");
                }
                defaults.password.clone()
            }
        };
        let timeout = match lookup("NEO4J_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(
                v.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::invalid("NEO4J_TIMEOUT_MS", e.to_string()))?,
            ),
            None => defaults.timeout,
        };
        let neo4j = Neo4jConfig {
            url: lookup("NEO4J_URL").unwrap_or(defaults.url),
            user: lookup("NEO4J_USER").unwrap_or(defaults.user),
            password,
            database: lookup("NEO4J_DATABASE").unwrap_or(defaults.database),
            timeout,
        };

        let default_threshold = match lookup("SEARCH_DEFAULT_THRESHOLD") {
            Some(v) => v
                .trim()
                .parse::<f64>()
                .map_err(|e| ConfigError::invalid("SEARCH_DEFAULT_THRESHOLD", e.to_string()))?,
            None => DEFAULT_THRESHOLD,
        };

        let ingest = match lookup("INGEST_MAX_IN_FLIGHT") {
            Some(v) if !v.trim().is_empty() => {
                let n = v
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| ConfigError::invalid("INGEST_MAX_IN_FLIGHT", e.to_string()))?;
                let n = NonZeroUsize::new(n).ok_or_else(|| {
                    ConfigError::invalid("INGEST_MAX_IN_FLIGHT", "must be at least 1")
                })?;
                IngestConfig::unbounded().with_max_in_flight(n)
            }
            _ => IngestConfig::unbounded(),
        };

        Ok(Self {
            bind_addr,
            storage,
            neo4j,
            default_threshold,
            ingest,
        })
    }
}
