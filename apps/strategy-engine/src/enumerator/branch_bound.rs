//! Branch-and-bound enumeration.
//!
//! Depth-first over non-decreasing instrument indices. Every node is a
//! leg set in its own right and is evaluated when its scalar totals pass;
//! children are skipped when a per-leg filter fails (both are monotone) or
//! when [`ScalarTotals::can_reach`] proves no completion can pass.

use rayon::prelude::*;

use super::combinations::MAX_LEGS;
use super::pool::WorkerBatch;
use super::progress::ProgressTracker;
use crate::cancel::CancelFlag;
use crate::evaluator::{Evaluator, Leg, LegDirection, ScalarTotals};

/// Per-worker search frame reused across root tasks.
struct SearchFrame {
    legs: [Leg; MAX_LEGS],
    totals: [ScalarTotals; MAX_LEGS + 1],
    scratch: Vec<f64>,
    batch: WorkerBatch,
}

/// Shared read-only context of one run.
struct Run<'a> {
    evaluator: Evaluator<'a>,
    cancel: &'a CancelFlag,
    max_legs: usize,
    n: u32,
}

impl SearchFrame {
    fn new(grid_len: usize) -> Self {
        Self {
            legs: [Leg::long(0); MAX_LEGS],
            totals: [ScalarTotals::default(); MAX_LEGS + 1],
            scratch: vec![0.0; grid_len],
            batch: WorkerBatch::default(),
        }
    }

    /// Try `leg` at position `depth` and, if it survives, explore below it.
    fn descend(&mut self, run: &Run<'_>, depth: usize, leg: Leg) {
        if let Err(reason) = run.evaluator.check_leg(&self.legs[..depth], leg) {
            self.batch.reject(depth + 1, reason);
            return;
        }

        let inst = run.evaluator.cache().instrument(leg.index);
        let totals = self.totals[depth].with_leg(inst, leg.direction);
        let remaining = run.max_legs - depth - 1;
        let bounds = run.evaluator.cache().bounds();
        if !totals.can_reach(remaining, bounds, run.evaluator.constraints()) {
            self.batch.pruned += 1;
            return;
        }

        self.legs[depth] = leg;
        self.totals[depth + 1] = totals;
        self.visit(run, depth + 1);
    }

    /// Evaluate the node holding `depth` legs, then its children.
    fn visit(&mut self, run: &Run<'_>, depth: usize) {
        let totals = self.totals[depth];
        let legs = &self.legs[..depth];
        let outcome = totals
            .check(run.evaluator.constraints())
            .and_then(|()| run.evaluator.evaluate_checked(legs, &totals, &mut self.scratch));
        match outcome {
            Ok(candidate) => self.batch.accept(candidate),
            Err(reason) => self.batch.reject(depth, reason),
        }

        if depth == run.max_legs {
            return;
        }
        let start = self.legs[depth - 1].index;
        for index in start..run.n {
            for direction in LegDirection::BOTH {
                if run.cancel.is_requested() {
                    return;
                }
                self.descend(run, depth, Leg::new(index, direction));
            }
        }
    }
}

/// Enumerate every leg set of 1..=`max_legs` legs with pruning.
///
/// Root tasks are all (instrument, direction) first legs. Subtree sizes
/// vary wildly, so roots are always spread over the pool one at a time.
pub(super) fn enumerate(
    evaluator: Evaluator<'_>,
    max_legs: usize,
    cancel: &CancelFlag,
    tracker: &ProgressTracker,
) -> WorkerBatch {
    let cache = evaluator.cache();
    let run = Run {
        evaluator,
        cancel,
        max_legs,
        n: u32::try_from(cache.len()).unwrap_or(u32::MAX),
    };
    let grid_len = cache.grid_len();
    let roots: Vec<Leg> = (0..run.n)
        .flat_map(|index| LegDirection::BOTH.map(|direction| Leg::new(index, direction)))
        .collect();

    roots
        .par_iter()
        .with_max_len(1)
        .fold(
            || SearchFrame::new(grid_len),
            |mut frame, root| {
                if !run.cancel.is_requested() {
                    frame.descend(&run, 0, *root);
                    tracker.advance(1);
                }
                frame
            },
        )
        .map(|frame| frame.batch)
        .reduce(WorkerBatch::default, WorkerBatch::merge)
}
