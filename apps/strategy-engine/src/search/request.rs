//! Search request and its precondition checks.

use serde::{Deserialize, Serialize};

use crate::enumerator::{EnumerationMode, max_legs_allowed};
use crate::error::SearchError;
use crate::evaluator::SearchConstraints;
use crate::scoring::{ResolvedWeights, WeightSet};

/// Default number of strategies returned per ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Default factor applied to `top_n` before deduplication.
pub const DEFAULT_DEDUP_OVERSAMPLE: usize = 4;

/// One search invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Largest leg count explored; every count from 1 up to it is searched.
    pub max_legs: usize,
    /// Risk and exposure constraints.
    #[serde(default)]
    pub constraints: SearchConstraints,
    /// How the leg-set space is walked.
    #[serde(default)]
    pub mode: EnumerationMode,
    /// Strategies returned per ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Collapse same-payoff strategies before truncating to `top_n`.
    #[serde(default = "default_true")]
    pub dedup: bool,
    /// Candidates kept per ranking ahead of dedup, as a multiple of `top_n`.
    #[serde(default = "default_dedup_oversample")]
    pub dedup_oversample: usize,
    /// Named weight configurations; at least one.
    pub weight_sets: Vec<WeightSet>,
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

const fn default_true() -> bool {
    true
}

const fn default_dedup_oversample() -> usize {
    DEFAULT_DEDUP_OVERSAMPLE
}

impl SearchRequest {
    /// Request with default constraints and a single weight set.
    #[must_use]
    pub fn new(max_legs: usize, weight_set: WeightSet) -> Self {
        Self {
            max_legs,
            constraints: SearchConstraints::default(),
            mode: EnumerationMode::default(),
            top_n: DEFAULT_TOP_N,
            dedup: true,
            dedup_oversample: DEFAULT_DEDUP_OVERSAMPLE,
            weight_sets: vec![weight_set],
        }
    }

    /// Builder: constraints.
    #[must_use]
    pub fn with_constraints(mut self, constraints: SearchConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Builder: enumeration mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: EnumerationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: result cap.
    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Builder: dedup switch.
    #[must_use]
    pub const fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    /// Builder: append a weight set.
    #[must_use]
    pub fn with_weight_set(mut self, weight_set: WeightSet) -> Self {
        self.weight_sets.push(weight_set);
        self
    }

    /// Candidates the scorer keeps per ranking.
    #[must_use]
    pub fn retained_per_ranking(&self) -> usize {
        if self.dedup {
            self.top_n.saturating_mul(self.dedup_oversample.max(1))
        } else {
            self.top_n
        }
    }

    /// Check every precondition against a universe of `universe_len`
    /// instruments and resolve the weight sets.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyWeightSets`], [`SearchError::InvalidTopN`],
    /// [`SearchError::InvalidLegCount`], or the weight resolution errors.
    pub fn validate(&self, universe_len: usize) -> Result<Vec<ResolvedWeights>, SearchError> {
        if self.weight_sets.is_empty() {
            return Err(SearchError::EmptyWeightSets);
        }
        if self.top_n == 0 {
            return Err(SearchError::InvalidTopN);
        }
        let max_allowed = max_legs_allowed(universe_len);
        if self.max_legs == 0 || self.max_legs > max_allowed {
            return Err(SearchError::InvalidLegCount {
                requested: self.max_legs,
                max_allowed,
            });
        }
        self.weight_sets.iter().map(WeightSet::resolve).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest::new(2, WeightSet::new("pnl").with_weight("average_pnl", 1.0))
    }

    #[test]
    fn test_defaults_from_json() {
        let json = r#"{"max_legs": 3, "weight_sets": [{"name": "a"}]}"#;
        let parsed: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.top_n, DEFAULT_TOP_N);
        assert!(parsed.dedup);
        assert_eq!(parsed.dedup_oversample, DEFAULT_DEDUP_OVERSAMPLE);
        assert_eq!(parsed.mode, EnumerationMode::Exhaustive);
        assert_eq!(parsed.constraints, SearchConstraints::default());
    }

    #[test]
    fn test_retained_per_ranking() {
        assert_eq!(request().with_top_n(5).retained_per_ranking(), 20);
        assert_eq!(request().with_top_n(5).with_dedup(false).retained_per_ranking(), 5);
    }

    #[test]
    fn test_validate_order() {
        let mut empty = request();
        empty.weight_sets.clear();
        assert!(matches!(empty.validate(4), Err(SearchError::EmptyWeightSets)));

        assert!(matches!(request().with_top_n(0).validate(4), Err(SearchError::InvalidTopN)));

        let err = request().validate(1).unwrap_err();
        assert!(matches!(err, SearchError::InvalidLegCount { requested: 2, max_allowed: 1 }));

        let resolved = request().validate(4).unwrap();
        assert_eq!(resolved.len(), 1);
    }
}
