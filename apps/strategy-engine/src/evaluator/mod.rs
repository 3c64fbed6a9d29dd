//! Candidate evaluation: rejection filters, P&L curve and metrics.
//!
//! Rejections are ordinary values ([`RejectReason`]), not errors; the
//! enumerators count them and move on.

mod constraints;
mod curve;
mod evaluate;
mod filters;
mod leg;
mod metrics;

pub use constraints::{SearchConstraints, UNBOUNDED};
pub use curve::{CurveProfile, CurveScan, MAX_BREAKEVENS, accumulate_curve};
pub use evaluate::Evaluator;
pub use filters::{RejectReason, RejectionCounts, ScalarTotals};
pub use leg::{Leg, LegDirection, LegView};
pub use metrics::{Candidate, LEVERAGE_PREMIUM_FLOOR, StrategyMetrics, avg_pnl_leverage};
