//! Cooperative cancellation flag shared between the controller and workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag.
///
/// Workers poll with relaxed ordering once per work unit; the controller
/// writes it once. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    stop: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a lowered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask running and future searches to stop.
    pub fn request(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Lower the flag so the next search can run.
    pub fn reset(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    #[inline]
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_roundtrip() {
        let flag = CancelFlag::new();
        assert!(!flag.is_requested());
        flag.request();
        assert!(flag.is_requested());
        flag.reset();
        assert!(!flag.is_requested());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = CancelFlag::new();
        let worker_view = flag.clone();
        flag.request();
        assert!(worker_view.is_requested());
    }
}
