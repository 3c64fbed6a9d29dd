//! Error types for the strategy engine.
//!
//! Three outcomes are distinguished:
//!
//! | Class | Examples | Behavior |
//! |-------|----------|----------|
//! | Precondition | uninitialized cache, invalid leg count, empty weight sets | Fails the invocation immediately |
//! | Cancelled | stop flag raised mid-search | Reported once all workers quiesce, no partial results |
//! | Internal | thread pool construction | Fails the invocation |
//!
//! Per-candidate rejections are *not* errors. They are counted in
//! [`crate::evaluator::RejectionCounts`] and otherwise dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::universe::UniverseError;

/// Error codes for the strategy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Search invoked before `init` or after `clear`.
    UninitializedCache,
    /// Universe arrays failed validation at load time.
    InvalidUniverse,
    /// Malformed search request (leg count, weights, top-N).
    InvalidRequest,
    /// Search stopped through the cooperative stop flag.
    Cancelled,
    /// Unexpected engine failure.
    InternalError,
}

/// Taxonomy class of an [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The caller violated a precondition; retrying unchanged will fail again.
    Precondition,
    /// The search was cancelled on request.
    Cancelled,
    /// Engine-side failure.
    Internal,
}

impl ErrorCode {
    /// Get the taxonomy class for this code.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UninitializedCache | Self::InvalidUniverse | Self::InvalidRequest => {
                ErrorClass::Precondition
            }
            Self::Cancelled => ErrorClass::Cancelled,
            Self::InternalError => ErrorClass::Internal,
        }
    }

    /// Get the stable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::UninitializedCache => "UNINITIALIZED_CACHE",
            Self::InvalidUniverse => "INVALID_UNIVERSE",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Cancelled => "CANCELLED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Errors returned by a search invocation or cache load.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The universe cache has not been initialized (or was cleared).
    #[error("Universe cache is not initialized; call init() first")]
    UninitializedCache,

    /// Universe failed validation.
    #[error(transparent)]
    Universe(#[from] UniverseError),

    /// Requested leg count is out of range.
    #[error("Invalid leg count {requested}: must be within 1..={max_allowed}")]
    InvalidLegCount {
        /// Requested maximum leg count.
        requested: usize,
        /// min(universe size, leg cap).
        max_allowed: usize,
    },

    /// No weight configuration supplied.
    #[error("At least one weight set is required")]
    EmptyWeightSets,

    /// A weight map referenced a metric outside the catalogue.
    #[error("Unknown scoring metric '{name}' in weight set '{weight_set}'")]
    UnknownMetric {
        /// Weight set name.
        weight_set: String,
        /// Offending metric name.
        name: String,
    },

    /// A weight was negative or not finite.
    #[error("Invalid weight {weight} for metric '{metric}' in weight set '{weight_set}'")]
    InvalidWeight {
        /// Weight set name.
        weight_set: String,
        /// Metric name.
        metric: String,
        /// Offending weight.
        weight: f64,
    },

    /// Result cap of zero.
    #[error("top_n must be at least 1")]
    InvalidTopN,

    /// Search was cancelled through the stop flag.
    #[error("Search cancelled by request")]
    Cancelled,

    /// Dedicated thread pool could not be built.
    #[error("Failed to initialize thread pool: {message}")]
    ThreadPool {
        /// Error message.
        message: String,
    },
}

impl SearchError {
    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UninitializedCache => ErrorCode::UninitializedCache,
            Self::Universe(_) => ErrorCode::InvalidUniverse,
            Self::InvalidLegCount { .. }
            | Self::EmptyWeightSets
            | Self::UnknownMetric { .. }
            | Self::InvalidWeight { .. }
            | Self::InvalidTopN => ErrorCode::InvalidRequest,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::ThreadPool { .. } => ErrorCode::InternalError,
        }
    }

    /// Whether this error is the cancellation outcome.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_classes() {
        assert_eq!(
            ErrorCode::UninitializedCache.class(),
            ErrorClass::Precondition
        );
        assert_eq!(ErrorCode::InvalidRequest.class(), ErrorClass::Precondition);
        assert_eq!(ErrorCode::Cancelled.class(), ErrorClass::Cancelled);
        assert_eq!(ErrorCode::InternalError.class(), ErrorClass::Internal);
    }

    #[test]
    fn test_search_error_codes() {
        assert_eq!(
            SearchError::UninitializedCache.code(),
            ErrorCode::UninitializedCache
        );
        assert_eq!(
            SearchError::InvalidLegCount {
                requested: 0,
                max_allowed: 4
            }
            .code(),
            ErrorCode::InvalidRequest
        );
        assert!(SearchError::Cancelled.is_cancelled());
        assert!(!SearchError::EmptyWeightSets.is_cancelled());
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::UninitializedCache).unwrap();
        assert_eq!(json, "\"UNINITIALIZED_CACHE\"");
        assert_eq!(ErrorCode::Cancelled.to_string(), "CANCELLED");
    }
}
