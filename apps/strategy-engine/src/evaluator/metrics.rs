//! Metrics record of an accepted candidate.

use serde::{Deserialize, Serialize};

use super::leg::LegView;
use crate::universe::N_INTRA_DATES;

/// Floor on |premium| in the P&L leverage ratio.
pub const LEVERAGE_PREMIUM_FLOOR: f64 = 0.005;

/// Aggregates of an accepted candidate.
///
/// Sums are sign-weighted over legs (long +1, short -1) unless noted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategyMetrics {
    /// Net premium (positive = debit).
    pub total_premium: f64,
    /// Net delta.
    pub total_delta: f64,
    /// Net gamma.
    pub total_gamma: f64,
    /// Net vega.
    pub total_vega: f64,
    /// Net theta.
    pub total_theta: f64,
    /// Signed sum of implied volatilities.
    pub total_iv: f64,
    /// Unsigned mean of the legs' implied volatilities.
    pub avg_implied_volatility: f64,
    /// Net average expected P&L.
    pub total_average_pnl: f64,
    /// Net P&L standard deviation proxy.
    pub total_sigma_pnl: f64,
    /// Net roll.
    pub total_roll: f64,
    /// Net previous-quarter roll.
    pub total_roll_quarterly: f64,
    /// Net raw roll.
    pub total_roll_sum: f64,
    /// Net tail penalty.
    pub total_tail_penalty: f64,

    /// Global maximum of the P&L curve.
    pub max_profit: f64,
    /// Global minimum of the P&L curve.
    pub max_loss: f64,
    /// Worst loss left of `average_mix` (<= 0).
    pub max_loss_left: f64,
    /// Worst loss right of `average_mix` (<= 0).
    pub max_loss_right: f64,
    /// Interpolated breakevens, ascending.
    pub breakeven_points: Vec<f64>,
    /// Lower edge of the profit zone.
    pub min_profit_price: f64,
    /// Upper edge of the profit zone.
    pub max_profit_price: f64,
    /// Width of the profit zone.
    pub profit_zone_width: f64,
    /// Mixture-weighted share of the grid where the curve is positive.
    pub probability_of_profit: f64,

    /// Number of call legs.
    pub call_count: u32,
    /// Number of put legs.
    pub put_count: u32,

    /// `total_average_pnl / max(|total_premium|, 0.005)`.
    pub avg_pnl_leverage: f64,

    /// Net value at each intra-life checkpoint.
    pub intra_life_prices: [f64; N_INTRA_DATES],
    /// Net P&L at each intra-life checkpoint.
    pub intra_life_pnl: [f64; N_INTRA_DATES],
    /// Mean of `intra_life_pnl`.
    pub avg_intra_life_pnl: f64,
}

impl StrategyMetrics {
    /// Worst loss of the curve, capped at 0.
    ///
    /// Equals `min(max_loss_left, max_loss_right)`. A curve that never dips
    /// below zero reports 0 rather than its lowest gain.
    #[must_use]
    pub fn worst_loss(&self) -> f64 {
        self.max_loss.min(0.0)
    }
}

/// An accepted candidate: its legs plus metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Legs in index order.
    pub legs: Vec<LegView>,
    /// Aggregates.
    pub metrics: StrategyMetrics,
}

impl Candidate {
    /// Number of legs.
    #[must_use]
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }
}

/// P&L leverage with the premium floor applied.
#[must_use]
pub fn avg_pnl_leverage(total_average_pnl: f64, total_premium: f64) -> f64 {
    total_average_pnl / total_premium.abs().max(LEVERAGE_PREMIUM_FLOOR)
}
