//! Progress tracking across enumeration workers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Shared unit counter for one leg-count level or one branch-and-bound run.
///
/// Workers report whole tasks (a block of units, a root subtree), never
/// single units, so the counter stays off the hot path.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    completed: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a tracker expecting `total` units.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            completed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record `n` finished units.
    pub fn advance(&self, n: u64) {
        self.completed.fetch_add(n, Ordering::Relaxed);
    }

    /// Get current progress.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> Progress {
        let completed = self.completed.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed();

        let units_per_sec = if elapsed.as_secs_f64() > 0.0 {
            completed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Progress {
            total: self.total,
            completed,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            units_per_sec,
        }
    }
}

/// Progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Expected units.
    pub total: u64,
    /// Finished units.
    pub completed: u64,
    /// Elapsed wall time in milliseconds.
    pub elapsed_ms: u64,
    /// Throughput.
    pub units_per_sec: f64,
}

impl Progress {
    /// Get completion percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }
}
