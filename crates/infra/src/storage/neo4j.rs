//! Neo4j-backed product index.
//!
//! Talks to Neo4j's HTTP transactional endpoint (`/db/{database}/tx/commit`)
//! and relies on a full-text index over both derived text fields.
//!
//! ## Error Mapping
//!
//! | Failure | StorageError |
//! |---------|--------------|
//! | connect / timeout / non-2xx status | `Unavailable` |
//! | `errors` array in the response body | `Query` |
//! | unreadable response body, bad row shape | `RowDecode` |

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::{debug, instrument};

use prodsearch_core::{ProductId, StorageError};
use prodsearch_products::{IndexedProduct, Product};
use prodsearch_search::{FIELD_WITH_SPACES, FIELD_WITHOUT_SPACES};

use super::r#trait::ProductIndex;

/// Name of the full-text index queried by `similarity_search`.
pub const FULL_TEXT_INDEX: &str = "product_full_text_index";

const CREATE_PRODUCT: &str = "CREATE (p:Product {id: $id, title: $title, \
description: $description, price: $price, fullTextWithSpaces: $fullTextWithSpaces, \
fullTextWithoutSpaces: $fullTextWithoutSpaces})";

const SEARCH_PRODUCTS: &str = "CALL db.index.fulltext.queryNodes($index, $query, \
{analyzer: $analyzer}) YIELD node RETURN node.id AS id, node.title AS title, \
node.description AS description, node.price AS price";

const CREATE_FULL_TEXT_INDEX: &str = "CREATE FULLTEXT INDEX product_full_text_index IF NOT EXISTS \
FOR (p:Product) ON EACH [p.fullTextWithSpaces, p.fullTextWithoutSpaces]";

/// Connection settings for [`Neo4jHttpIndex`].
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    /// Base HTTP URL, e.g. `http://localhost:7474`.
    pub url: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub timeout: Duration,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7474".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Neo4jConfig {
    fn commit_url(&self) -> String {
        format!(
            "{}/db/{}/tx/commit",
            self.url.trim_end_matches('/'),
            self.database
        )
    }
}

/// Product index stored in Neo4j.
///
/// ## Thread Safety
///
/// Holds a `reqwest::Client`, which pools connections and is safe to share;
/// the whole index is `Send + Sync` and is meant to live behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Neo4jHttpIndex {
    client: reqwest::Client,
    config: Neo4jConfig,
}

impl Neo4jHttpIndex {
    pub fn new(config: Neo4jConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::unavailable(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Create the full-text index over both derived fields if it is missing.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.run(CREATE_FULL_TEXT_INDEX, json!({})).await?;
        Ok(())
    }

    /// Round-trip a trivial statement to check the server answers.
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.run("RETURN 1", json!({})).await?;
        Ok(())
    }

    async fn run(
        &self,
        statement: &str,
        parameters: JsonValue,
    ) -> Result<StatementResult, StorageError> {
        let body = json!({
            "statements": [{ "statement": statement, "parameters": parameters }]
        });

        let resp = self
            .client
            .post(self.config.commit_url())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StorageError::unavailable(format!("neo4j returned {status}: {text}")));
        }

        let parsed: TxResponse = resp
            .json()
            .await
            .map_err(|e| StorageError::row_decode(format!("unreadable response: {e}")))?;

        parsed.into_single_result()
    }
}

#[async_trait::async_trait]
impl ProductIndex for Neo4jHttpIndex {
    #[instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn create_record(&self, product: &IndexedProduct) -> Result<(), StorageError> {
        self.run(CREATE_PRODUCT, create_parameters(product)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn similarity_search(
        &self,
        query: &str,
        analyzer: &str,
    ) -> Result<Vec<Product>, StorageError> {
        let result = self
            .run(
                SEARCH_PRODUCTS,
                json!({ "index": FULL_TEXT_INDEX, "query": query, "analyzer": analyzer }),
            )
            .await?;
        let products = result.decode_products()?;
        debug!(rows = products.len(), "full-text query returned");
        Ok(products)
    }
}

fn create_parameters(product: &IndexedProduct) -> JsonValue {
    let p = product.product();
    let mut params = serde_json::Map::new();
    params.insert("id".into(), json!(p.id.as_str()));
    params.insert("title".into(), json!(p.title));
    params.insert("description".into(), json!(p.description));
    params.insert("price".into(), json!(p.price));
    params.insert(FIELD_WITH_SPACES.into(), json!(product.full_text_with_spaces()));
    params.insert(FIELD_WITHOUT_SPACES.into(), json!(product.full_text_without_spaces()));
    JsonValue::Object(params)
}

// -------------------------
// Wire types (HTTP API)
// -------------------------

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Debug, Deserialize)]
struct DataRow {
    row: Vec<JsonValue>,
}

impl TxResponse {
    fn into_single_result(self) -> Result<StatementResult, StorageError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(StorageError::query(format!("{}: {}", err.code, err.message)));
        }
        Ok(self.results.into_iter().next().unwrap_or_default())
    }
}

impl StatementResult {
    fn column(&self, name: &str) -> Result<usize, StorageError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| StorageError::row_decode(format!("missing column {name:?}")))
    }

    fn decode_products(&self) -> Result<Vec<Product>, StorageError> {
        let id = self.column("id")?;
        let title = self.column("title")?;
        let description = self.column("description")?;
        let price = self.column("price")?;

        self.data
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(Product {
                    id: ProductId::new(string_cell(&row.row, id, "id", i)?),
                    title: string_cell(&row.row, title, "title", i)?,
                    description: string_cell(&row.row, description, "description", i)?,
                    price: number_cell(&row.row, price, "price", i)?,
                })
            })
            .collect()
    }
}

fn cell<'a>(
    row: &'a [JsonValue],
    idx: usize,
    name: &str,
    row_no: usize,
) -> Result<&'a JsonValue, StorageError> {
    row.get(idx)
        .ok_or_else(|| StorageError::row_decode(format!("row {row_no}: missing {name}")))
}

fn string_cell(
    row: &[JsonValue],
    idx: usize,
    name: &str,
    row_no: usize,
) -> Result<String, StorageError> {
    match cell(row, idx, name, row_no)? {
        JsonValue::String(s) => Ok(s.clone()),
        other => Err(StorageError::row_decode(format!(
            "row {row_no}: {name} should be a string, got {other}"
        ))),
    }
}

fn number_cell(
    row: &[JsonValue],
    idx: usize,
    name: &str,
    row_no: usize,
) -> Result<f64, StorageError> {
    let value = cell(row, idx, name, row_no)?;
    value.as_f64().ok_or_else(|| {
        StorageError::row_decode(format!("row {row_no}: {name} should be a number, got {value}"))
    })
}
