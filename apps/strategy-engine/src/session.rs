//! Engine session: owns the universe cache and the stop flag.
//!
//! A session replaces process-wide state. It is `Send + Sync`; share it
//! behind an `Arc` to call [`EngineSession::request_stop`] from another
//! thread while a search runs.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cancel::CancelFlag;
use crate::enumerator::ParallelConfig;
use crate::error::SearchError;
use crate::search::{SearchRequest, SearchResponse, run_search};
use crate::universe::{UniverseCache, UniverseInput};

/// Cache lifecycle plus cooperative cancellation.
#[derive(Debug, Default)]
pub struct EngineSession {
    /// Current universe; `None` before `init` and after `clear`.
    cache: RwLock<Option<Arc<UniverseCache>>>,
    /// Stop flag shared with running workers.
    cancel: CancelFlag,
    /// Worker pool settings.
    parallel: ParallelConfig,
}

impl EngineSession {
    /// Empty session using the global rayon pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session with explicit pool settings.
    #[must_use]
    pub fn with_parallel(parallel: ParallelConfig) -> Self {
        Self {
            parallel,
            ..Self::default()
        }
    }

    /// Pool settings.
    #[must_use]
    pub const fn parallel(&self) -> &ParallelConfig {
        &self.parallel
    }

    /// Load a universe, replacing any previous one, and lower the stop flag.
    ///
    /// The new cache is fully built before it is swapped in; on error the
    /// previous cache stays in place.
    ///
    /// # Errors
    ///
    /// [`SearchError::Universe`] when the payload fails validation.
    pub fn init(&self, input: UniverseInput) -> Result<(), SearchError> {
        let cache = Arc::new(UniverseCache::from_input(input)?);
        let instruments = cache.len();
        let grid = cache.grid_len();

        *self.cache.write() = Some(cache);
        self.cancel.reset();

        info!(instruments, grid, "Universe cache initialized");
        Ok(())
    }

    /// Release the cache. Calling it twice is harmless.
    pub fn clear(&self) {
        if self.cache.write().take().is_some() {
            debug!("Universe cache cleared");
        }
    }

    /// Whether a universe is loaded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cache.read().is_some()
    }

    /// Snapshot of the loaded universe.
    #[must_use]
    pub fn cache(&self) -> Option<Arc<UniverseCache>> {
        self.cache.read().clone()
    }

    /// Run one search against the loaded universe.
    ///
    /// A concurrent `init` or `clear` does not affect a search already
    /// running; it keeps its own snapshot.
    ///
    /// # Errors
    ///
    /// [`SearchError::UninitializedCache`] without a universe, otherwise
    /// whatever [`run_search`] returns.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let cache = self.cache().ok_or(SearchError::UninitializedCache)?;
        run_search(&cache, request, &self.cancel, &self.parallel)
    }

    /// Ask running and future searches to stop.
    pub fn request_stop(&self) {
        self.cancel.request();
    }

    /// Lower the stop flag.
    pub fn reset_stop(&self) {
        self.cancel.reset();
    }

    /// Whether a stop is pending.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.cancel.is_requested()
    }

    /// Handle on the stop flag.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::WeightSet;
    use crate::universe::InstrumentRow;

    fn input() -> UniverseInput {
        UniverseInput::over_grid(vec![90.0, 100.0, 110.0], vec![0.3, 0.4, 0.3], 100.0)
            .with_instrument(InstrumentRow {
                premium: 2.0,
                delta: 0.5,
                strike: 100.0,
                is_call: true,
                pnl: vec![-2.0, -2.0, 8.0],
                ..InstrumentRow::default()
            })
    }

    fn request() -> SearchRequest {
        SearchRequest::new(1, WeightSet::new("pnl").with_weight("average_pnl", 1.0))
    }

    #[test]
    fn test_search_before_init_fails() {
        let session = EngineSession::new();
        assert!(!session.is_initialized());
        let err = session.search(&request()).unwrap_err();
        assert!(matches!(err, SearchError::UninitializedCache));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let session = EngineSession::new();
        session.init(input()).unwrap();
        assert!(session.is_initialized());
        session.clear();
        session.clear();
        assert!(!session.is_initialized());
        assert!(matches!(
            session.search(&request()),
            Err(SearchError::UninitializedCache)
        ));
    }

    #[test]
    fn test_failed_init_keeps_previous_cache() {
        let session = EngineSession::new();
        session.init(input()).unwrap();
        let mut bad = input();
        bad.mixture.pop();
        assert!(session.init(bad).is_err());
        assert_eq!(session.cache().map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_init_resets_stop_flag() {
        let session = EngineSession::new();
        session.request_stop();
        assert!(session.is_stop_requested());
        session.init(input()).unwrap();
        assert!(!session.is_stop_requested());
    }

    #[test]
    fn test_session_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineSession>();
    }
}
