//! Total P&L curve accumulation and the single-pass curve profile.

use serde::{Deserialize, Serialize};

use super::leg::Leg;
use crate::universe::UniverseCache;

/// Maximum number of breakeven points retained per candidate.
pub const MAX_BREAKEVENS: usize = 10;

/// Shape statistics of a total P&L curve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveProfile {
    /// Global maximum of the curve.
    pub max_profit: f64,
    /// Global minimum of the curve.
    pub max_loss: f64,
    /// Worst value left of `average_mix`, capped at 0.
    pub max_loss_left: f64,
    /// Worst value at or right of `average_mix`, capped at 0.
    pub max_loss_right: f64,
    /// Interpolated zero crossings, ascending, at most [`MAX_BREAKEVENS`].
    pub breakeven_points: Vec<f64>,
    /// Lowest grid price with a positive curve (0 if none).
    pub min_profit_price: f64,
    /// Highest grid price with a positive curve (0 if none).
    pub max_profit_price: f64,
    /// `max_profit_price - min_profit_price`.
    pub profit_zone_width: f64,
    /// Mixture mass over positive points divided by total mass.
    pub probability_of_profit: f64,
}

/// Incremental scanner fed one grid point at a time.
///
/// The evaluator drives it from inside its loss-filter loop so the curve is
/// only walked once.
#[derive(Debug, Clone)]
pub struct CurveScan {
    split: f64,
    seen: bool,
    max_profit: f64,
    max_loss: f64,
    left_min: f64,
    right_min: f64,
    breakevens: [f64; MAX_BREAKEVENS],
    n_breakevens: usize,
    profit_lo: Option<f64>,
    profit_hi: f64,
    positive_mass: f64,
    total_mass: f64,
    prev: Option<(f64, f64)>,
}

impl CurveScan {
    /// Start a scan with the left/right split at `split`.
    #[must_use]
    pub const fn new(split: f64) -> Self {
        Self {
            split,
            seen: false,
            max_profit: f64::NEG_INFINITY,
            max_loss: f64::INFINITY,
            left_min: 0.0,
            right_min: 0.0,
            breakevens: [0.0; MAX_BREAKEVENS],
            n_breakevens: 0,
            profit_lo: None,
            profit_hi: 0.0,
            positive_mass: 0.0,
            total_mass: 0.0,
            prev: None,
        }
    }

    /// Feed the next grid point (prices must arrive ascending).
    #[inline]
    pub fn observe(&mut self, price: f64, pnl: f64, density: f64) {
        self.seen = true;
        self.max_profit = self.max_profit.max(pnl);
        self.max_loss = self.max_loss.min(pnl);

        if price < self.split {
            self.left_min = self.left_min.min(pnl);
        } else {
            self.right_min = self.right_min.min(pnl);
        }

        if let Some((p0, v0)) = self.prev
            && v0 * pnl < 0.0
            && self.n_breakevens < MAX_BREAKEVENS
        {
            self.breakevens[self.n_breakevens] = p0 + (price - p0) * (-v0 / (pnl - v0));
            self.n_breakevens += 1;
        }
        self.prev = Some((price, pnl));

        self.total_mass += density;
        if pnl > 0.0 {
            self.positive_mass += density;
            if self.profit_lo.is_none() {
                self.profit_lo = Some(price);
            }
            self.profit_hi = price;
        }
    }

    /// Close the scan.
    #[must_use]
    pub fn finish(self) -> CurveProfile {
        let (max_profit, max_loss) = if self.seen {
            (self.max_profit, self.max_loss)
        } else {
            (0.0, 0.0)
        };
        let (min_profit_price, max_profit_price) = self
            .profit_lo
            .map_or((0.0, 0.0), |lo| (lo, self.profit_hi));
        let probability_of_profit = if self.total_mass > 0.0 {
            self.positive_mass / self.total_mass
        } else {
            0.0
        };

        CurveProfile {
            max_profit,
            max_loss,
            max_loss_left: self.left_min,
            max_loss_right: self.right_min,
            breakeven_points: self.breakevens[..self.n_breakevens].to_vec(),
            min_profit_price,
            max_profit_price,
            profit_zone_width: max_profit_price - min_profit_price,
            probability_of_profit,
        }
    }
}

/// Write Σ sign·row into `out`: the first leg assigns, the rest add.
///
/// `out` must be exactly one grid long; `legs` must be non-empty.
pub fn accumulate_curve(cache: &UniverseCache, legs: &[Leg], out: &mut [f64]) {
    let Some((first, rest)) = legs.split_first() else {
        out.fill(0.0);
        return;
    };

    let sign = first.direction.sign();
    for (dst, &v) in out.iter_mut().zip(cache.pnl_row(first.index)) {
        *dst = sign * v;
    }
    for leg in rest {
        let sign = leg.direction.sign();
        for (dst, &v) in out.iter_mut().zip(cache.pnl_row(leg.index)) {
            *dst += sign * v;
        }
    }
}
