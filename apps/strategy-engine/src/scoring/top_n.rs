//! Bounded top-N selection over (score, pool index) pairs.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Heap entry. Ordered by score, then by *lower* pool index first, so an
/// earlier candidate beats a later one with the same score.
#[derive(Debug, Clone, Copy)]
struct Entry {
    score: f64,
    index: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Keeps the `cap` best entries seen so far in a min-heap.
#[derive(Debug)]
pub struct TopN {
    cap: usize,
    heap: BinaryHeap<Reverse<Entry>>,
}

impl TopN {
    /// Tracker retaining at most `cap` entries.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            heap: BinaryHeap::with_capacity(cap.saturating_add(1).min(1 << 16)),
        }
    }

    /// Offer a candidate.
    pub fn push(&mut self, score: f64, index: usize) {
        if self.cap == 0 {
            return;
        }
        let entry = Entry { score, index };
        if self.heap.len() < self.cap {
            self.heap.push(Reverse(entry));
        } else if let Some(mut worst) = self.heap.peek_mut()
            && entry > worst.0
        {
            *worst = Reverse(entry);
        }
    }

    /// Retained `(index, score)` pairs, best first.
    #[must_use]
    pub fn into_sorted(self) -> Vec<(usize, f64)> {
        // Ascending Reverse<Entry> is descending Entry.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(e)| (e.index, e.score))
            .collect()
    }
}
