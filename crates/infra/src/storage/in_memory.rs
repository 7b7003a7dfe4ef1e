use std::sync::RwLock;

use strsim::{levenshtein, normalized_levenshtein};

use prodsearch_core::StorageError;
use prodsearch_products::{IndexedProduct, Product};
use prodsearch_search::{ANALYZER, FIELD_WITH_SPACES, FIELD_WITHOUT_SPACES};

use super::r#trait::ProductIndex;

/// In-memory full-text engine.
///
/// Intended for tests/dev. Understands the two query shapes the planner emits:
///
/// - `field: some text~0.4`: fuzzy match of every term against the field's
///   terms; a value in `(.., 1]` is a minimum normalized Levenshtein similarity,
///   a value above 1 is a maximum edit distance.
/// - `field: foo* OR bar*`: prefix (or exact, without `*`) term clauses.
///
/// Terms are case folded. Results come back best score first; equal scores keep
/// insertion order. An empty operand matches nothing. Not optimized for size.
#[derive(Debug, Default)]
pub struct InMemoryProductIndex {
    records: RwLock<Vec<StoredRecord>>,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    product: Product,
    with_spaces: String,
    without_spaces: String,
}

impl StoredRecord {
    fn field(&self, field: Field) -> &str {
        match field {
            Field::WithSpaces => &self.with_spaces,
            Field::WithoutSpaces => &self.without_spaces,
        }
    }
}

impl InMemoryProductIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn search(&self, query: &ParsedQuery) -> Result<Vec<Product>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::unavailable("lock poisoned"))?;

        let mut scored: Vec<(f64, &StoredRecord)> = records
            .iter()
            .filter_map(|r| query.score(r).map(|s| (s, r)))
            .collect();

        // Stable: ties keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored.into_iter().map(|(_, r)| r.product.clone()).collect())
    }
}

#[async_trait::async_trait]
impl ProductIndex for InMemoryProductIndex {
    async fn create_record(&self, product: &IndexedProduct) -> Result<(), StorageError> {
        let record = StoredRecord {
            product: product.product().clone(),
            with_spaces: product.full_text_with_spaces().to_string(),
            without_spaces: product.full_text_without_spaces().to_string(),
        };

        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::unavailable("lock poisoned"))?;
        records.push(record);
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &str,
        analyzer: &str,
    ) -> Result<Vec<Product>, StorageError> {
        if analyzer != ANALYZER && analyzer != "standard" {
            return Err(StorageError::query(format!("unknown analyzer: {analyzer}")));
        }
        let parsed = parse_query(query)?;
        self.search(&parsed)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Field {
    WithSpaces,
    WithoutSpaces,
}

impl Field {
    fn parse(name: &str) -> Result<Self, StorageError> {
        match name {
            FIELD_WITH_SPACES => Ok(Field::WithSpaces),
            FIELD_WITHOUT_SPACES => Ok(Field::WithoutSpaces),
            other => Err(StorageError::query(format!("unknown field: {other:?}"))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Tolerance {
    Similarity(f64),
    Edits(usize),
}

impl Tolerance {
    fn from_value(v: f64) -> Self {
        if v > 1.0 {
            Tolerance::Edits(v.floor() as usize)
        } else {
            Tolerance::Similarity(v)
        }
    }

    /// Similarity of the pair if it is within tolerance.
    fn accept(self, query_term: &str, doc_term: &str) -> Option<f64> {
        let sim = normalized_levenshtein(query_term, doc_term);
        let ok = match self {
            Tolerance::Similarity(min) => sim >= min,
            Tolerance::Edits(max) => levenshtein(query_term, doc_term) <= max,
        };
        ok.then_some(sim)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    term: String,
    prefix: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum ParsedQuery {
    Empty,
    Fuzzy {
        field: Field,
        terms: Vec<String>,
        tolerance: Tolerance,
    },
    Terms {
        field: Field,
        clauses: Vec<Clause>,
    },
}

impl ParsedQuery {
    fn score(&self, record: &StoredRecord) -> Option<f64> {
        match self {
            ParsedQuery::Empty => None,
            ParsedQuery::Fuzzy {
                field,
                terms,
                tolerance,
            } => {
                if terms.is_empty() {
                    return None;
                }
                let doc_terms = tokenize(record.field(*field));
                let mut total = 0.0;
                let mut matched = false;
                for term in terms {
                    let best = doc_terms
                        .iter()
                        .filter_map(|d| tolerance.accept(term, d))
                        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
                    if let Some(s) = best {
                        matched = true;
                        total += s;
                    }
                }
                matched.then(|| total / terms.len() as f64)
            }
            ParsedQuery::Terms { field, clauses } => {
                let doc_terms = tokenize(record.field(*field));
                let hits = clauses
                    .iter()
                    .filter(|c| {
                        doc_terms.iter().any(|d| {
                            if c.prefix {
                                d.starts_with(c.term.as_str())
                            } else {
                                *d == c.term
                            }
                        })
                    })
                    .count();
                (hits > 0).then_some(hits as f64)
            }
        }
    }
}

fn parse_query(query: &str) -> Result<ParsedQuery, StorageError> {
    let (field, operand) = query
        .split_once(':')
        .ok_or_else(|| StorageError::query(format!("missing field in query {query:?}")))?;
    let field = Field::parse(field.trim())?;
    let operand = operand.trim();

    if operand.is_empty() {
        return Ok(ParsedQuery::Empty);
    }

    // `text~<number>` wins over everything else.
    if let Some((text, raw)) = operand.rsplit_once('~') {
        if let Ok(value) = raw.trim().parse::<f64>() {
            return Ok(ParsedQuery::Fuzzy {
                field,
                terms: tokenize(text),
                tolerance: Tolerance::from_value(value),
            });
        }
    }

    let clauses = operand
        .split(" OR ")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| match c.strip_suffix('*') {
            Some(p) => Clause {
                term: fold(p),
                prefix: true,
            },
            None => Clause {
                term: fold(c),
                prefix: false,
            },
        })
        .collect();

    Ok(ParsedQuery::Terms { field, clauses })
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(fold)
        .collect()
}

#[cfg(test)]
impl InMemoryProductIndex {
    /// Stored products in insertion order.
    pub(crate) fn products(&self) -> Vec<Product> {
        self.records
            .read()
            .map(|records| records.iter().map(|r| r.product.clone()).collect())
            .unwrap_or_default()
    }
}
