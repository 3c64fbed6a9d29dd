//! Exhaustive enumeration: every k-multiset crossed with every sign mask.
//!
//! The unit space of one leg count is `combination_rank x sign_mask`. It is
//! cut into blocks of roughly `chunk_size` units; a block unranks its first
//! combination once and then walks the successor function, so no combination
//! table is ever materialised.

use rayon::prelude::*;

use super::combinations::{MAX_LEGS, multiset_count, next_combination, unrank_combination};
use super::parallel::ParallelConfig;
use super::pool::WorkerBatch;
use super::progress::ProgressTracker;
use crate::cancel::CancelFlag;
use crate::evaluator::{Evaluator, Leg, LegDirection};

/// Worker-private state reused across blocks.
struct WorkerState {
    batch: WorkerBatch,
    combo: [u32; MAX_LEGS],
    legs: [Leg; MAX_LEGS],
    scratch: Vec<f64>,
}

impl WorkerState {
    fn new(grid_len: usize) -> Self {
        Self {
            batch: WorkerBatch::default(),
            combo: [0; MAX_LEGS],
            legs: [Leg::long(0); MAX_LEGS],
            scratch: vec![0.0; grid_len],
        }
    }

    fn run_block(&mut self, level: &Level<'_>, block: u64) {
        let k = level.k;
        let first = block * level.combos_per_block;
        let count = level.combos_per_block.min(level.n_combos - first);
        let combo = &mut self.combo[..k];
        unrank_combination(first, level.n, combo);

        for step in 0..count {
            if step > 0 {
                next_combination(combo, level.n);
            }
            for mask in 0..(1u32 << k) {
                if level.cancel.is_requested() {
                    return;
                }
                for (i, leg) in self.legs[..k].iter_mut().enumerate() {
                    *leg = Leg::new(combo[i], LegDirection::from_mask(mask, i));
                }
                match level.evaluator.evaluate(&self.legs[..k], &mut self.scratch) {
                    Ok(candidate) => self.batch.accept(candidate),
                    Err(reason) => self.batch.reject(k, reason),
                }
            }
        }
        level.tracker.advance(count << k);
    }
}

/// Shared read-only context of one leg-count level.
struct Level<'a> {
    evaluator: Evaluator<'a>,
    cancel: &'a CancelFlag,
    tracker: &'a ProgressTracker,
    k: usize,
    n: u32,
    n_combos: u64,
    combos_per_block: u64,
}

/// Enumerate every leg set of exactly `k` legs.
///
/// Returns whatever was gathered before a stop request; the caller checks
/// the flag and discards partial results.
pub(super) fn enumerate_level(
    evaluator: Evaluator<'_>,
    k: usize,
    cancel: &CancelFlag,
    parallel: &ParallelConfig,
    tracker: &ProgressTracker,
) -> WorkerBatch {
    let cache = evaluator.cache();
    let n = u32::try_from(cache.len()).unwrap_or(u32::MAX);
    let n_combos = multiset_count(u64::from(n), k as u64);
    let masks = 1u64 << k;
    let combos_per_block = (parallel.effective_chunk_size() as u64 / masks).max(1);
    let n_blocks = n_combos.div_ceil(combos_per_block);

    let level = Level {
        evaluator,
        cancel,
        tracker,
        k,
        n,
        n_combos,
        combos_per_block,
    };
    let grid_len = cache.grid_len();

    if parallel.should_parallelize(n_combos.saturating_mul(masks)) {
        let blocks = usize::try_from(n_blocks).unwrap_or(usize::MAX);
        (0..blocks)
            .into_par_iter()
            .fold(
                || WorkerState::new(grid_len),
                |mut state, block| {
                    state.run_block(&level, block as u64);
                    state
                },
            )
            .map(|state| state.batch)
            .reduce(WorkerBatch::default, WorkerBatch::merge)
    } else {
        let mut state = WorkerState::new(grid_len);
        for block in 0..n_blocks {
            state.run_block(&level, block);
        }
        state.batch
    }
}
