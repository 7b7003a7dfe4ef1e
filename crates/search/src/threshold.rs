//! Similarity threshold handed to the engine's fuzzy operator.

use serde::{Deserialize, Serialize};

/// Similarity fraction. Meaningful range is (0, 1]; anything else is passed
/// through untouched and left for the engine to interpret.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Whether the value lies in (0, 1].
    pub fn is_in_range(self) -> bool {
        self.0 > 0.0 && self.0 <= 1.0
    }
}

impl From<f64> for Threshold {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Renders the shortest decimal string that parses back to the same value:
/// no exponent, no trailing zeros, `.` as separator regardless of locale.
impl core::fmt::Display for Threshold {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // f64's Display is already shortest-round-trip and never uses exponent notation.
        write!(f, "{}", self.0)
    }
}
