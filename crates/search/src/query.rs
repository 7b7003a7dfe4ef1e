use serde::{Deserialize, Serialize};

use crate::threshold::Threshold;

/// A raw search request.
///
/// `text` is taken as-is: empty and whitespace-only strings are valid and are
/// planned like any other input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub threshold: Threshold,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, threshold: impl Into<Threshold>) -> Self {
        Self {
            text: text.into(),
            threshold: threshold.into(),
        }
    }

    /// Whitespace-delimited tokens in first-appearance order (duplicates kept).
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}
