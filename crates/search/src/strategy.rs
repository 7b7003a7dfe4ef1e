//! Match strategies: one engine query per fallback step.

use serde::{Deserialize, Serialize};

use crate::query::SearchQuery;
use crate::{FIELD_WITH_SPACES, FIELD_WITHOUT_SPACES};

/// Strategy tags in the order they are tried.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Fuzzy match of the whole query against the spaced text.
    Proximity,
    /// Per-token prefix match against the compact text, OR-combined.
    TokenWildcard,
}

impl StrategyKind {
    /// First strategy of every plan.
    pub const FIRST: StrategyKind = StrategyKind::Proximity;

    /// The strategy tried when this one comes back empty.
    pub fn next(self) -> Option<StrategyKind> {
        match self {
            StrategyKind::Proximity => Some(StrategyKind::TokenWildcard),
            StrategyKind::TokenWildcard => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Proximity => "proximity",
            StrategyKind::TokenWildcard => "token_wildcard",
        }
    }

    /// Build this strategy's engine query for `query`.
    pub fn build(self, query: &SearchQuery) -> MatchStrategy {
        let query_string = match self {
            StrategyKind::Proximity => proximity_query(query),
            StrategyKind::TokenWildcard => token_wildcard_query(query),
        };
        MatchStrategy {
            kind: self,
            query: query_string,
        }
    }
}

impl core::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A materialized strategy: its tag and the query string sent verbatim to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStrategy {
    kind: StrategyKind,
    query: String,
}

impl MatchStrategy {
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

// `fullTextWithSpaces: <raw text>~<threshold>`
fn proximity_query(query: &SearchQuery) -> String {
    format!("{FIELD_WITH_SPACES}: {}~{}", query.text, query.threshold)
}

// `fullTextWithoutSpaces: a* OR b* ...`; with no tokens the operand is left empty.
fn token_wildcard_query(query: &SearchQuery) -> String {
    let operand = query
        .tokens()
        .map(|t| format!("{t}*"))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("{FIELD_WITHOUT_SPACES}: {operand}")
}
