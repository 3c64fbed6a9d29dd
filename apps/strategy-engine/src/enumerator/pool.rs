//! Worker batches and the merged candidate pool.

use serde::{Deserialize, Serialize};

use super::EnumerationMode;
use super::combinations::MAX_LEGS;
use crate::evaluator::{Candidate, RejectReason, RejectionCounts};

/// Outcome tallies for one leg count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegCountStats {
    /// Leg count.
    pub legs: usize,
    /// Leg sets looked at.
    pub units: u64,
    /// Leg sets accepted.
    pub valid: u64,
    /// Leg sets rejected by a filter.
    pub rejected: u64,
}

/// Aggregate diagnostics of one enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDiagnostics {
    /// Mode that produced the pool.
    pub mode: EnumerationMode,
    /// Sum of `units` over all leg counts.
    pub units_evaluated: u64,
    /// Branch-and-bound subtrees cut by the reachability bound.
    pub pruned_subtrees: u64,
    /// Rejections by reason.
    pub rejections: RejectionCounts,
    /// One entry per leg count, ascending.
    pub per_leg_count: Vec<LegCountStats>,
}

impl SearchDiagnostics {
    /// Valid candidates over all leg counts.
    #[must_use]
    pub fn valid_total(&self) -> u64 {
        self.per_leg_count.iter().map(|s| s.valid).sum()
    }
}

/// Every accepted candidate of one search plus its diagnostics.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    /// Candidates in enumeration order.
    pub candidates: Vec<Candidate>,
    /// Tallies gathered while enumerating.
    pub diagnostics: SearchDiagnostics,
}

impl CandidatePool {
    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidate survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Results owned by one worker, handed to the coordinator on merge.
#[derive(Debug, Default)]
pub(crate) struct WorkerBatch {
    pub candidates: Vec<Candidate>,
    pub units: [u64; MAX_LEGS],
    pub valid: [u64; MAX_LEGS],
    pub rejected: [u64; MAX_LEGS],
    pub rejections: RejectionCounts,
    pub pruned: u64,
}

impl WorkerBatch {
    #[inline]
    pub fn accept(&mut self, candidate: Candidate) {
        let slot = candidate.leg_count() - 1;
        self.units[slot] += 1;
        self.valid[slot] += 1;
        self.candidates.push(candidate);
    }

    #[inline]
    pub fn reject(&mut self, legs: usize, reason: RejectReason) {
        self.units[legs - 1] += 1;
        self.rejected[legs - 1] += 1;
        self.rejections.record(reason);
    }

    /// Append `other` after `self`, keeping enumeration order.
    #[must_use]
    pub fn merge(mut self, mut other: Self) -> Self {
        self.candidates.append(&mut other.candidates);
        for i in 0..MAX_LEGS {
            self.units[i] += other.units[i];
            self.valid[i] += other.valid[i];
            self.rejected[i] += other.rejected[i];
        }
        self.rejections.merge(&other.rejections);
        self.pruned += other.pruned;
        self
    }

    /// Leg-count tallies for `1..=max_legs`.
    pub fn stats(&self, max_legs: usize) -> Vec<LegCountStats> {
        (1..=max_legs)
            .map(|legs| LegCountStats {
                legs,
                units: self.units[legs - 1],
                valid: self.valid[legs - 1],
                rejected: self.rejected[legs - 1],
            })
            .collect()
    }

    pub fn into_pool(self, mode: EnumerationMode, max_legs: usize) -> CandidatePool {
        let per_leg_count = self.stats(max_legs);
        CandidatePool {
            diagnostics: SearchDiagnostics {
                mode,
                units_evaluated: per_leg_count.iter().map(|s| s.units).sum(),
                pruned_subtrees: self.pruned,
                rejections: self.rejections,
                per_leg_count,
            },
            candidates: self.candidates,
        }
    }
}
