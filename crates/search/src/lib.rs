//! Fuzzy-match query planning.
//!
//! Turns a raw search string plus a similarity threshold into the ordered list
//! of full-text queries that should be tried against the storage engine. Pure
//! logic: nothing here talks to storage; see `prodsearch-infra` for execution.

pub mod planner;
pub mod query;
pub mod strategy;
pub mod threshold;

pub use planner::{Plan, plan};
pub use query::SearchQuery;
pub use strategy::{MatchStrategy, StrategyKind};
pub use threshold::Threshold;

/// Index field holding `title + " " + description`.
pub const FIELD_WITH_SPACES: &str = "fullTextWithSpaces";

/// Index field holding title and description with spaces stripped.
pub const FIELD_WITHOUT_SPACES: &str = "fullTextWithoutSpaces";

/// Analyzer requested from the engine for every search.
pub const ANALYZER: &str = "standard-folding";
