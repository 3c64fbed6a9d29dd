//! Candidate enumeration over the leg-count ladder.
//!
//! Two modes produce the same set of accepted candidates:
//!
//! - [`EnumerationMode::Exhaustive`]: for each k, every non-decreasing
//!   size-k index combination (instruments may repeat) crossed with all 2^k
//!   sign masks. Work per k is C(N + k - 1, k) · 2^k units and every unit is
//!   evaluated.
//! - [`EnumerationMode::BranchAndBound`]: depth-first with monotone per-leg
//!   filters and conservative reachability bounds built from the universe
//!   maxima.
//!
//! Workers own their scratch buffers and result batches. Batches are merged
//! by rayon's ordered reduce, so the pool order is deterministic.

mod branch_bound;
mod combinations;
mod exhaustive;
mod parallel;
mod pool;
mod progress;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use combinations::{MAX_LEGS, binomial, multiset_count, next_combination, unrank_combination, work_units};
pub use parallel::ParallelConfig;
pub use pool::{CandidatePool, LegCountStats, SearchDiagnostics};
pub use progress::{Progress, ProgressTracker};

use crate::cancel::CancelFlag;
use crate::error::SearchError;
use crate::evaluator::{Evaluator, SearchConstraints};
use crate::universe::UniverseCache;
use pool::WorkerBatch;

/// How the leg-set space is walked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationMode {
    /// Every combination and sign mask.
    #[default]
    Exhaustive,
    /// Depth-first with pruning.
    BranchAndBound,
}

impl EnumerationMode {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exhaustive => "exhaustive",
            Self::BranchAndBound => "branch_and_bound",
        }
    }
}

impl std::fmt::Display for EnumerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest valid `max_legs` for a universe of `n` instruments.
#[must_use]
pub fn max_legs_allowed(n: usize) -> usize {
    n.min(MAX_LEGS)
}

/// Enumerate and evaluate every leg set of 1..=`max_legs` legs.
///
/// # Errors
///
/// - [`SearchError::InvalidLegCount`] if `max_legs` is outside
///   `1..=min(N, MAX_LEGS)`.
/// - [`SearchError::Cancelled`] if the stop flag is raised before or
///   during enumeration. Partial results are dropped.
/// - [`SearchError::ThreadPool`] if a dedicated pool cannot be built.
pub fn collect_candidates(
    cache: &UniverseCache,
    constraints: &SearchConstraints,
    max_legs: usize,
    mode: EnumerationMode,
    cancel: &CancelFlag,
    parallel: &ParallelConfig,
) -> Result<CandidatePool, SearchError> {
    let max_allowed = max_legs_allowed(cache.len());
    if max_legs == 0 || max_legs > max_allowed {
        return Err(SearchError::InvalidLegCount {
            requested: max_legs,
            max_allowed,
        });
    }

    debug!(
        mode = %mode,
        max_legs,
        threads = parallel.effective_thread_count(),
        "Starting enumeration"
    );
    let evaluator = Evaluator::new(cache, constraints);
    let batch = parallel.install(|| match mode {
        EnumerationMode::Exhaustive => run_exhaustive(evaluator, max_legs, cancel, parallel),
        EnumerationMode::BranchAndBound => run_branch_and_bound(evaluator, max_legs, cancel),
    })?;

    if cancel.is_requested() {
        warn!(mode = %mode, "Enumeration cancelled, discarding partial results");
        return Err(SearchError::Cancelled);
    }

    Ok(batch.into_pool(mode, max_legs))
}

fn run_exhaustive(
    evaluator: Evaluator<'_>,
    max_legs: usize,
    cancel: &CancelFlag,
    parallel: &ParallelConfig,
) -> WorkerBatch {
    let n = evaluator.cache().len() as u64;
    let mut merged = WorkerBatch::default();

    for k in 1..=max_legs {
        if cancel.is_requested() {
            break;
        }
        let tracker = ProgressTracker::new(work_units(n, k));
        let level = exhaustive::enumerate_level(evaluator, k, cancel, parallel, &tracker);
        let progress = tracker.progress();

        info!(
            legs = k,
            units = level.units[k - 1],
            valid = level.valid[k - 1],
            percent = progress.percentage(),
            elapsed_ms = progress.elapsed_ms,
            units_per_sec = progress.units_per_sec,
            "Leg count enumerated"
        );
        merged = merged.merge(level);
    }
    merged
}

fn run_branch_and_bound(evaluator: Evaluator<'_>, max_legs: usize, cancel: &CancelFlag) -> WorkerBatch {
    let roots = 2 * evaluator.cache().len() as u64;
    let tracker = ProgressTracker::new(roots);
    let batch = branch_bound::enumerate(evaluator, max_legs, cancel, &tracker);
    let progress = tracker.progress();

    for stats in batch.stats(max_legs) {
        info!(
            legs = stats.legs,
            units = stats.units,
            valid = stats.valid,
            "Leg count enumerated"
        );
    }
    info!(
        roots = progress.completed,
        percent = progress.percentage(),
        pruned_subtrees = batch.pruned,
        elapsed_ms = progress.elapsed_ms,
        "Branch-and-bound complete"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::RejectReason;
    use crate::universe::{InstrumentRow, UniverseInput};

    fn cache(n: usize) -> UniverseCache {
        let prices = vec![80.0, 90.0, 100.0, 110.0, 120.0];
        let mut input = UniverseInput::over_grid(prices.clone(), vec![0.2; 5], 100.0);
        for i in 0..n {
            let strike = 85.0 + 5.0 * i as f64;
            let is_call = i % 2 == 0;
            let premium = 1.0 + 0.25 * i as f64;
            let pnl = prices
                .iter()
                .map(|p| {
                    let intrinsic = if is_call { p - strike } else { strike - p };
                    intrinsic.max(0.0) - premium
                })
                .collect();
            input = input.with_instrument(InstrumentRow {
                premium,
                delta: if is_call { 0.4 } else { -0.4 },
                average_pnl: 0.1 * (i as f64 - 1.5),
                strike,
                is_call,
                pnl,
                ..InstrumentRow::default()
            });
        }
        UniverseCache::from_input(input).unwrap()
    }

    #[test]
    fn test_exhaustive_accounts_for_every_unit() {
        let cache = cache(5);
        let constraints = SearchConstraints {
            max_premium: 2.0,
            ..SearchConstraints::default()
        };
        let pool = collect_candidates(
            &cache,
            &constraints,
            3,
            EnumerationMode::Exhaustive,
            &CancelFlag::new(),
            &ParallelConfig::default(),
        )
        .unwrap();

        for stats in &pool.diagnostics.per_leg_count {
            assert_eq!(stats.units, work_units(5, stats.legs));
            assert_eq!(stats.valid + stats.rejected, stats.units);
        }
        assert_eq!(pool.diagnostics.valid_total(), pool.len() as u64);
        assert_eq!(
            pool.diagnostics.rejections.total() + pool.len() as u64,
            pool.diagnostics.units_evaluated
        );
    }

    #[test]
    fn test_parallel_and_sequential_pools_match() {
        let cache = cache(6);
        let constraints = SearchConstraints::default();
        let sequential = ParallelConfig {
            min_parallel_units: u64::MAX,
            ..ParallelConfig::default()
        };
        let parallel = ParallelConfig {
            min_parallel_units: 0,
            chunk_size: 4,
            max_threads: 3,
        };
        let a = collect_candidates(&cache, &constraints, 3, EnumerationMode::Exhaustive, &CancelFlag::new(), &sequential).unwrap();
        let b = collect_candidates(&cache, &constraints, 3, EnumerationMode::Exhaustive, &CancelFlag::new(), &parallel).unwrap();
        assert_eq!(a.candidates, b.candidates);
        assert_eq!(a.diagnostics, b.diagnostics);
    }

    #[test]
    fn test_leg_count_out_of_range() {
        let cache = cache(3);
        for max_legs in [0, 4] {
            let err = collect_candidates(
                &cache,
                &SearchConstraints::default(),
                max_legs,
                EnumerationMode::BranchAndBound,
                &CancelFlag::new(),
                &ParallelConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, SearchError::InvalidLegCount { max_allowed: 3, .. }));
        }
    }

    #[test]
    fn test_raised_flag_cancels_without_results() {
        let cache = cache(4);
        let cancel = CancelFlag::new();
        cancel.request();
        for mode in [EnumerationMode::Exhaustive, EnumerationMode::BranchAndBound] {
            let err = collect_candidates(&cache, &SearchConstraints::default(), 2, mode, &cancel, &ParallelConfig::default())
                .unwrap_err();
            assert!(err.is_cancelled());
        }
    }

    #[test]
    fn test_useless_sell_blocks_single_short() {
        let cache = cache(1);
        let constraints = SearchConstraints {
            min_premium_sell: 6.0,
            ..SearchConstraints::default()
        };
        let pool = collect_candidates(&cache, &constraints, 1, EnumerationMode::Exhaustive, &CancelFlag::new(), &ParallelConfig::default())
            .unwrap();
        assert_eq!(pool.diagnostics.rejections.get(RejectReason::UselessSell), 1);
        assert!(pool.candidates.iter().all(|c| c.legs[0].direction == crate::evaluator::LegDirection::Long));
    }
}
