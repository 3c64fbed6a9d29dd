//! Search defaults applied by the runner.

use serde::{Deserialize, Serialize};

use crate::enumerator::EnumerationMode;
use crate::evaluator::SearchConstraints;
use crate::scoring::WeightSet;
use crate::search::{DEFAULT_DEDUP_OVERSAMPLE, DEFAULT_TOP_N, SearchRequest};

/// Search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Largest leg count explored.
    #[serde(default = "default_max_legs")]
    pub max_legs: usize,
    /// Enumeration mode.
    #[serde(default)]
    pub mode: EnumerationMode,
    /// Strategies returned per ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Same-payoff deduplication.
    #[serde(default = "default_true")]
    pub dedup: bool,
    /// Candidates kept ahead of dedup, as a multiple of `top_n`.
    #[serde(default = "default_dedup_oversample")]
    pub dedup_oversample: usize,
    /// Risk constraints.
    #[serde(default)]
    pub constraints: SearchConstraints,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_legs: default_max_legs(),
            mode: EnumerationMode::default(),
            top_n: DEFAULT_TOP_N,
            dedup: true,
            dedup_oversample: DEFAULT_DEDUP_OVERSAMPLE,
            constraints: SearchConstraints::default(),
        }
    }
}

impl SearchSettings {
    /// Build a request scoring under `weight_sets`.
    #[must_use]
    pub fn to_request(&self, weight_sets: Vec<WeightSet>) -> SearchRequest {
        SearchRequest {
            max_legs: self.max_legs,
            constraints: self.constraints.clone(),
            mode: self.mode,
            top_n: self.top_n,
            dedup: self.dedup,
            dedup_oversample: self.dedup_oversample,
            weight_sets,
        }
    }
}

const fn default_max_legs() -> usize {
    4
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

const fn default_dedup_oversample() -> usize {
    DEFAULT_DEDUP_OVERSAMPLE
}

pub(super) const fn default_true() -> bool {
    true
}
