//! Same-payoff deduplication of ranked candidates.
//!
//! Two candidates match when their legs, sorted by (strike, direction),
//! agree on strike and direction, differ in call/put flag on an even number
//! of legs, and have worst-case losses within [`MAX_LOSS_TOLERANCE`]. This
//! catches put-call-parity rewrites of the same structure. It is a
//! similarity rule, not a proof of equivalence.

use tracing::debug;

use crate::evaluator::{Candidate, LegView};

/// Strike equality tolerance.
pub const STRIKE_TOLERANCE: f64 = 1.0e-6;

/// Allowed worst-case loss difference between matching candidates.
pub const MAX_LOSS_TOLERANCE: f64 = 0.05;

/// Legs ordered by strike, then direction among strikes within
/// [`STRIKE_TOLERANCE`] of the first strike of their run.
fn sorted_legs(candidate: &Candidate) -> Vec<LegView> {
    let mut legs = candidate.legs.clone();
    legs.sort_by(|a, b| a.strike.total_cmp(&b.strike));

    let mut start = 0;
    while start < legs.len() {
        let anchor = legs[start].strike;
        let run = legs[start..]
            .iter()
            .take_while(|l| same_strike(l.strike, anchor))
            .count();
        legs[start..start + run].sort_by(|a, b| a.direction.cmp(&b.direction));
        start += run;
    }
    legs
}

fn same_strike(a: f64, b: f64) -> bool {
    (a - b).abs() <= STRIKE_TOLERANCE
}

/// Whether `a` and `b` represent the same payoff.
#[must_use]
pub fn are_same_payoff(a: &Candidate, b: &Candidate) -> bool {
    if a.legs.len() != b.legs.len() {
        return false;
    }
    let legs_a = sorted_legs(a);
    let legs_b = sorted_legs(b);

    let mut flag_differences = 0usize;
    for (x, y) in legs_a.iter().zip(&legs_b) {
        if !same_strike(x.strike, y.strike) || x.direction != y.direction {
            return false;
        }
        if x.option_type != y.option_type {
            flag_differences += 1;
        }
    }
    if flag_differences % 2 != 0 {
        return false;
    }

    (a.metrics.worst_loss() - b.metrics.worst_loss()).abs() <= MAX_LOSS_TOLERANCE
}

/// Keep items, best first, whose candidate matches none already kept.
///
/// Stops once `max_unique` items are kept.
pub fn remove_duplicates<T, F>(ranked: Vec<T>, max_unique: usize, candidate: F) -> Vec<T>
where
    F: Fn(&T) -> &Candidate,
{
    let mut kept: Vec<T> = Vec::with_capacity(max_unique.min(ranked.len()));
    let mut dropped = 0usize;

    for item in ranked {
        if kept.len() >= max_unique {
            break;
        }
        let is_duplicate = kept
            .iter()
            .any(|k| are_same_payoff(candidate(&item), candidate(k)));
        if is_duplicate {
            dropped += 1;
        } else {
            kept.push(item);
        }
    }

    if dropped > 0 {
        debug!(dropped, kept = kept.len(), "Removed same-payoff duplicates");
    }
    kept
}
