//! Weight sets scored by the runner.

use serde::{Deserialize, Serialize};

use crate::scoring::WeightSet;

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Named weight maps; each is a sparse override of the all-zero default.
    #[serde(default = "default_weight_sets")]
    pub weight_sets: Vec<WeightSet>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_sets: default_weight_sets(),
        }
    }
}

fn default_weight_sets() -> Vec<WeightSet> {
    vec![
        WeightSet::new("balanced")
            .with_weight("average_pnl", 2.0)
            .with_weight("max_loss", 1.0)
            .with_weight("delta_neutral", 1.0),
    ]
}
