//! Multi-configuration scoring with one shared normalization pass.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalogue::MetricId;
use super::top_n::TopN;
use super::weights::ResolvedWeights;
use crate::evaluator::Candidate;

/// Floor inside the logarithm of the geometric composite.
pub const SCORE_EPSILON: f64 = 1.0e-6;

/// One ranked pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedIndex {
    /// Position in the candidate pool.
    pub index: usize,
    /// Composite score.
    pub score: f64,
    /// 1-based rank.
    pub rank: usize,
}

/// Best-first ranking for one configuration (or the consensus).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Configuration name, or `"consensus"`.
    pub name: String,
    /// Entries, best first, ranks 1..=n.
    pub entries: Vec<RankedIndex>,
}

impl Ranking {
    fn from_top(name: String, top: TopN) -> Self {
        let entries = top
            .into_sorted()
            .into_iter()
            .enumerate()
            .map(|(i, (index, score))| RankedIndex {
                index,
                score,
                rank: i + 1,
            })
            .collect();
        Self { name, entries }
    }
}

/// Rankings of every configuration plus the consensus.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiScore {
    /// One ranking per configuration, in request order.
    pub per_set: Vec<Ranking>,
    /// Ranking by the sum of per-configuration scores.
    pub consensus: Ranking,
}

/// Observed range of one metric.
#[derive(Debug, Clone, Copy)]
struct MetricRange {
    min: f64,
    max: f64,
}

impl MetricRange {
    const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    fn widen(self, v: f64) -> Self {
        Self {
            min: self.min.min(v),
            max: self.max.max(v),
        }
    }

    fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Score `candidates` under every configuration and keep `keep` per ranking.
///
/// Metric ranges are computed once over the whole pool, sub-scores once per
/// candidate and metric, and each configuration only combines them.
#[must_use]
pub fn score_pool(candidates: &[Candidate], configs: &[ResolvedWeights], keep: usize) -> MultiScore {
    let needed: Vec<MetricId> = configs
        .iter()
        .flat_map(|c| c.terms.iter().map(|t| t.id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let slot = |id: MetricId| needed.iter().position(|&m| m == id).unwrap_or(0);
    let width = needed.len();

    let ranges: Vec<MetricRange> = candidates
        .par_iter()
        .fold(
            || vec![MetricRange::EMPTY; width],
            |mut acc, c| {
                for (range, id) in acc.iter_mut().zip(&needed) {
                    *range = range.widen(id.extract(&c.metrics));
                }
                acc
            },
        )
        .reduce(
            || vec![MetricRange::EMPTY; width],
            |a, b| a.into_iter().zip(b).map(|(x, y)| x.union(y)).collect(),
        );

    // (lo, hi) per needed metric; an empty pool falls back to [0, 1].
    let bounds: Vec<(f64, f64)> = needed
        .iter()
        .zip(&ranges)
        .map(|(id, r)| {
            let (normalizer, _) = id.behavior();
            if r.min > r.max {
                (0.0, 1.0)
            } else {
                normalizer.range(r.min, r.max)
            }
        })
        .collect();

    // Flat candidate-major sub-score matrix.
    let sub_scores: Vec<f64> = candidates
        .par_iter()
        .flat_map_iter(|c| {
            needed.iter().zip(&bounds).map(move |(id, &(lo, hi))| {
                let (_, direction) = id.behavior();
                direction.sub_score(id.extract(&c.metrics), lo, hi)
            })
        })
        .collect();

    let per_config_scores: Vec<Vec<f64>> = configs
        .iter()
        .map(|config| {
            let terms: Vec<(usize, f64)> = config
                .terms
                .iter()
                .map(|t| (slot(t.id), t.weight))
                .collect();
            (0..candidates.len())
                .into_par_iter()
                .map(|i| composite(&sub_scores[i * width..(i + 1) * width], &terms))
                .collect()
        })
        .collect();

    let per_set = configs
        .iter()
        .zip(&per_config_scores)
        .map(|(config, scores)| {
            let mut top = TopN::new(keep);
            for (i, &s) in scores.iter().enumerate() {
                top.push(s, i);
            }
            Ranking::from_top(config.name.clone(), top)
        })
        .collect();

    let mut consensus_top = TopN::new(keep);
    for i in 0..candidates.len() {
        let sum: f64 = per_config_scores.iter().map(|s| s[i]).sum();
        consensus_top.push(sum, i);
    }

    debug!(
        candidates = candidates.len(),
        configs = configs.len(),
        metrics = width,
        keep,
        "Scored candidate pool"
    );

    MultiScore {
        per_set,
        consensus: Ranking::from_top("consensus".to_string(), consensus_top),
    }
}

/// `exp(Σ w · ln(ε + x))` over renormalized weights; 0 with no terms.
fn composite(sub_scores: &[f64], terms: &[(usize, f64)]) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let log_sum: f64 = terms
        .iter()
        .map(|&(slot, w)| w * (SCORE_EPSILON + sub_scores[slot]).ln())
        .sum();
    log_sum.exp()
}
