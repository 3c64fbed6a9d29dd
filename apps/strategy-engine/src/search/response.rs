//! Search results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enumerator::SearchDiagnostics;
use crate::evaluator::{Candidate, Leg, StrategyMetrics, accumulate_curve};
use crate::universe::UniverseCache;

/// A returned strategy with its full P&L curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStrategy {
    /// 1-based rank within its list.
    pub rank: usize,
    /// Composite score (summed scores for the consensus list).
    pub score: f64,
    /// Instrument index per leg.
    pub option_indices: Vec<u32>,
    /// +1 long, -1 short, per leg.
    pub signs: Vec<i8>,
    /// Strike per leg.
    pub strikes: Vec<f64>,
    /// Call flag per leg.
    pub is_calls: Vec<bool>,
    /// Aggregates.
    pub metrics: StrategyMetrics,
    /// Σ sign · P&L row, one value per grid price.
    pub pnl_curve: Vec<f64>,
}

impl RankedStrategy {
    pub(crate) fn build(cache: &UniverseCache, candidate: &Candidate, rank: usize, score: f64) -> Self {
        let legs: Vec<Leg> = candidate.legs.iter().map(|l| l.leg()).collect();
        let mut pnl_curve = vec![0.0; cache.grid_len()];
        accumulate_curve(cache, &legs, &mut pnl_curve);

        Self {
            rank,
            score,
            option_indices: candidate.legs.iter().map(|l| l.index).collect(),
            signs: candidate.legs.iter().map(|l| l.direction.as_i8()).collect(),
            strikes: candidate.legs.iter().map(|l| l.strike).collect(),
            is_calls: candidate.legs.iter().map(|l| l.option_type.is_call()).collect(),
            metrics: candidate.metrics.clone(),
            pnl_curve,
        }
    }

    /// Number of legs.
    #[must_use]
    pub fn leg_count(&self) -> usize {
        self.option_indices.len()
    }
}

/// Ranked strategies for one weight set, or the consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedList {
    /// Weight set name, or `"consensus"`.
    pub name: String,
    /// Best first.
    pub strategies: Vec<RankedStrategy>,
}

/// Outcome of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Id carried by every log line of this search.
    pub search_id: Uuid,
    /// One list per weight set, in request order.
    pub per_set: Vec<RankedList>,
    /// Ranking by summed scores.
    pub consensus: RankedList,
    /// Candidates that passed every filter.
    pub n_candidates: usize,
    /// Weight sets scored.
    pub n_weight_sets: usize,
    /// Enumeration tallies.
    pub diagnostics: SearchDiagnostics,
    /// Wall time in milliseconds.
    pub elapsed_ms: u64,
}

impl SearchResponse {
    /// List for the named weight set.
    #[must_use]
    pub fn ranking(&self, name: &str) -> Option<&RankedList> {
        self.per_set.iter().find(|r| r.name == name)
    }
}
