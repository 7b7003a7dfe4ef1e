//! Query planner: the ordered, lazily materialized fallback chain.

use crate::query::SearchQuery;
use crate::strategy::{MatchStrategy, StrategyKind};

/// Plan the strategies for `query`.
///
/// Nothing is built up front; each [`MatchStrategy`] is produced when the
/// iterator is advanced, so a caller that stops after a hit never pays for the
/// later ones.
pub fn plan(query: &SearchQuery) -> Plan {
    Plan::new(query.clone())
}

/// Lazy iterator over the strategies for one query, in fixed order:
/// proximity first, then token wildcard.
#[derive(Debug, Clone)]
pub struct Plan {
    query: SearchQuery,
    next: Option<StrategyKind>,
}

impl Plan {
    pub fn new(query: SearchQuery) -> Self {
        Self {
            query,
            next: Some(StrategyKind::FIRST),
        }
    }
}

impl Iterator for Plan {
    type Item = MatchStrategy;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.next?;
        self.next = kind.next();
        Some(kind.build(&self.query))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let mut n = 0;
        let mut cur = self.next;
        while let Some(k) = cur {
            n += 1;
            cur = k.next();
        }
        (n, Some(n))
    }
}

impl ExactSizeIterator for Plan {}

impl core::iter::FusedIterator for Plan {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plan_yields_proximity_then_wildcard() {
        let strategies: Vec<_> = plan(&SearchQuery::new("red shoe", 0.1)).collect();
        assert_eq!(strategies.len(), 2);
        assert_eq!(strategies[0].kind(), StrategyKind::Proximity);
        assert_eq!(strategies[0].query(), "fullTextWithSpaces: red shoe~0.1");
        assert_eq!(strategies[1].kind(), StrategyKind::TokenWildcard);
        assert_eq!(strategies[1].query(), "fullTextWithoutSpaces: red* OR shoe*");
    }

    #[test]
    fn plan_is_lazy_and_fused() {
        let mut p = plan(&SearchQuery::new("shoe", 0.1));
        assert_eq!(p.len(), 2);

        let first = p.next().unwrap();
        assert_eq!(first.kind(), StrategyKind::Proximity);
        assert_eq!(p.len(), 1);

        assert_eq!(p.next().unwrap().query(), "fullTextWithoutSpaces: shoe*");
        assert!(p.next().is_none());
        assert!(p.next().is_none());
        assert_eq!(p.len(), 0);
    }

    #[test]
    fn empty_query_still_plans_both_strategies() {
        let strategies: Vec<_> = plan(&SearchQuery::new("", 0.5)).collect();
        assert_eq!(strategies[0].query(), "fullTextWithSpaces: ~0.5");
        assert_eq!(strategies[1].query(), "fullTextWithoutSpaces: ");
    }

    proptest! {
        /// Property: planning is deterministic.
        #[test]
        fn planning_is_deterministic(text in ".{0,40}", threshold in 0.0f64..=1.0) {
            let q = SearchQuery::new(text, threshold);
            let a: Vec<_> = plan(&q).collect();
            let b: Vec<_> = plan(&q).collect();
            prop_assert_eq!(a, b);
        }

        /// Property: the wildcard strategy has one clause per token.
        #[test]
        fn wildcard_has_one_clause_per_token(
            words in proptest::collection::vec("[a-z0-9]{1,8}", 1..6),
        ) {
            let q = SearchQuery::new(words.join(" "), 0.3);
            let wildcard = plan(&q).nth(1).unwrap();
            let operand = wildcard.query().trim_start_matches("fullTextWithoutSpaces: ");
            let clauses: Vec<&str> = operand.split(" OR ").collect();
            prop_assert_eq!(clauses.len(), words.len());
            for (clause, word) in clauses.iter().zip(&words) {
                prop_assert_eq!(*clause, format!("{word}*"));
            }
        }
    }
}
