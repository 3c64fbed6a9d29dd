// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_collect,
        clippy::items_after_statements
    )
)]

//! Strategy Engine - Multi-leg Options Strategy Search
//!
//! Searches combinations of (instrument, long/short) legs over a pre-priced
//! options universe, rejects those that break the risk constraints, scores
//! the survivors under one or more weight sets and returns the best
//! strategies per set plus a consensus ranking.
//!
//! # Pipeline
//!
//! 1. [`universe`]: validated, instrument-major P&L cache and universe bounds
//! 2. [`enumerator`]: exhaustive or branch-and-bound walk, worker-local batches
//! 3. [`evaluator`]: rejection filters, curve scan, aggregates
//! 4. [`scoring`]: one normalization pass, geometric composite, top-N
//! 5. [`dedup`]: same-payoff collapse
//! 6. [`search`]: wiring plus curve recomputation for returned strategies
//!
//! [`session::EngineSession`] owns the cache and the stop flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use strategy_engine::{EngineSession, SearchRequest, WeightSet};
//!
//! let session = EngineSession::new();
//! session.init(universe)?;
//! let request = SearchRequest::new(3, WeightSet::new("pnl").with_weight("average_pnl", 1.0));
//! let response = session.search(&request)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Cooperative stop flag.
pub mod cancel;

/// YAML configuration for the runner.
pub mod config;

/// Same-payoff deduplication.
pub mod dedup;

/// Exhaustive and branch-and-bound enumeration.
pub mod enumerator;

/// Error types and codes.
pub mod error;

/// Candidate filters, curve scan and metrics.
pub mod evaluator;

/// Prometheus metrics.
pub mod observability;

/// Multi-criteria scoring.
pub mod scoring;

/// Search orchestration.
pub mod search;

/// Cache lifecycle and cancellation.
pub mod session;

/// Tracing subscriber setup.
pub mod telemetry;

/// Options universe cache.
pub mod universe;

pub use cancel::CancelFlag;
pub use enumerator::{EnumerationMode, MAX_LEGS, ParallelConfig, SearchDiagnostics};
pub use error::{ErrorClass, ErrorCode, SearchError};
pub use evaluator::{Candidate, RejectReason, SearchConstraints, StrategyMetrics};
pub use scoring::{MetricId, WeightSet};
pub use search::{RankedList, RankedStrategy, SearchRequest, SearchResponse, run_search};
pub use session::EngineSession;
pub use universe::{InstrumentRow, UniverseCache, UniverseError, UniverseInput};
