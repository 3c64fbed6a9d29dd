//! Thread pool selection for the enumeration phase.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Configuration for the parallel enumeration phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Maximum number of threads to use (0 = rayon's global pool).
    pub max_threads: usize,

    /// Minimum work units claimed per task (0 = 1).
    pub chunk_size: usize,

    /// Leg-count levels with fewer units than this run sequentially.
    pub min_parallel_units: u64,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            chunk_size: 256,
            min_parallel_units: 2048,
        }
    }
}

impl ParallelConfig {
    /// Chunk size with the zero case resolved.
    #[must_use]
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Whether `units` is large enough to go parallel.
    #[must_use]
    pub const fn should_parallelize(&self, units: u64) -> bool {
        units >= self.min_parallel_units
    }

    /// Get effective thread count.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        if self.max_threads > 0 {
            self.max_threads
        } else {
            rayon::current_num_threads()
        }
    }

    /// Run `op` on a dedicated pool when `max_threads` is set, otherwise on
    /// the global pool.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ThreadPool`] if the dedicated pool cannot be built.
    pub fn install<R, F>(&self, op: F) -> Result<R, SearchError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.max_threads == 0 {
            return Ok(op());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_threads)
            .thread_name(|i| format!("strategy-worker-{i}"))
            .build()
            .map_err(|e| SearchError::ThreadPool {
                message: e.to_string(),
            })?;
        Ok(pool.install(op))
    }
}
