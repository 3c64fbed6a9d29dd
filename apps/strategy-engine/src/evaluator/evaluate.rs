//! Filter chain and full metrics computation for one candidate.

use super::constraints::SearchConstraints;
use super::curve::{CurveScan, accumulate_curve};
use super::filters::{RejectReason, ScalarTotals};
use super::leg::{Leg, LegDirection, LegView};
use super::metrics::{Candidate, StrategyMetrics, avg_pnl_leverage};
use crate::universe::{N_INTRA_DATES, UniverseCache};

/// Evaluates candidates against one constraint set.
///
/// Borrowing both the cache and the constraints keeps the evaluator free
/// to copy into every worker.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    cache: &'a UniverseCache,
    constraints: &'a SearchConstraints,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator.
    #[must_use]
    pub const fn new(cache: &'a UniverseCache, constraints: &'a SearchConstraints) -> Self {
        Self { cache, constraints }
    }

    /// Underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &'a UniverseCache {
        self.cache
    }

    /// Constraint set.
    #[must_use]
    pub const fn constraints(&self) -> &'a SearchConstraints {
        self.constraints
    }

    /// Per-leg filters for `leg` added on top of `existing`.
    ///
    /// Both tests are monotone: once a leg set fails, every superset fails,
    /// so branch-and-bound may skip the whole subtree.
    pub fn check_leg(&self, existing: &[Leg], leg: Leg) -> Result<(), RejectReason> {
        self.check_sell(leg)?;
        self.check_hedge(existing, leg)
    }

    fn check_sell(&self, leg: Leg) -> Result<(), RejectReason> {
        let premium = self.cache.instrument(leg.index).premium;
        if leg.direction == LegDirection::Short && premium < self.constraints.min_premium_sell {
            return Err(RejectReason::UselessSell);
        }
        Ok(())
    }

    fn check_hedge(&self, existing: &[Leg], leg: Leg) -> Result<(), RejectReason> {
        let inst = self.cache.instrument(leg.index);
        for other in existing {
            let o = self.cache.instrument(other.index);
            let same_contract = o.option_type == inst.option_type && o.strike == inst.strike;
            if same_contract && other.direction != leg.direction {
                return Err(RejectReason::RedundantHedge);
            }
        }
        Ok(())
    }

    /// Signed scalar totals, summed in leg order.
    #[must_use]
    pub fn scalar_totals(&self, legs: &[Leg]) -> ScalarTotals {
        legs.iter().fold(ScalarTotals::default(), |acc, leg| {
            acc.with_leg(self.cache.instrument(leg.index), leg.direction)
        })
    }

    /// Run every filter and, on success, compute the full metrics.
    ///
    /// `scratch` receives the total P&L curve and must be one grid long.
    pub fn evaluate(&self, legs: &[Leg], scratch: &mut [f64]) -> Result<Candidate, RejectReason> {
        // Every short leg is checked before any hedge pair.
        for &leg in legs {
            self.check_sell(leg)?;
        }
        for (i, &leg) in legs.iter().enumerate() {
            self.check_hedge(&legs[..i], leg)?;
        }

        let totals = self.scalar_totals(legs);
        totals.check(self.constraints)?;
        self.evaluate_checked(legs, &totals, scratch)
    }

    /// Curve-based filters and metrics for a leg set whose per-leg and
    /// scalar filters already passed.
    pub fn evaluate_checked(
        &self,
        legs: &[Leg],
        totals: &ScalarTotals,
        scratch: &mut [f64],
    ) -> Result<Candidate, RejectReason> {
        let c = self.constraints;
        accumulate_curve(self.cache, legs, scratch);

        let premium_floor = -totals.premium.abs();
        let left_floor = if c.premium_only_left {
            premium_floor
        } else {
            -c.max_loss_left
        };
        let right_floor = if c.premium_only_right {
            premium_floor
        } else {
            -c.max_loss_right
        };

        let mut scan = CurveScan::new(self.cache.average_mix());
        let points = self
            .cache
            .prices()
            .iter()
            .zip(scratch.iter())
            .zip(self.cache.mixture());
        for ((&price, &pnl), &density) in points {
            if price < c.limit_left {
                if pnl < left_floor {
                    return Err(RejectReason::LossLeft);
                }
            } else if price > c.limit_right {
                if pnl < right_floor {
                    return Err(RejectReason::LossRight);
                }
            } else if pnl < premium_floor {
                return Err(RejectReason::LossCenter);
            }
            scan.observe(price, pnl, density);
        }
        let profile = scan.finish();

        if c.premium_only && profile.max_loss < premium_floor {
            return Err(RejectReason::PremiumOnly);
        }

        let mut metrics = StrategyMetrics {
            total_premium: totals.premium,
            total_delta: totals.delta,
            total_average_pnl: totals.average_pnl,
            max_profit: profile.max_profit,
            max_loss: profile.max_loss,
            max_loss_left: profile.max_loss_left,
            max_loss_right: profile.max_loss_right,
            breakeven_points: profile.breakeven_points,
            min_profit_price: profile.min_profit_price,
            max_profit_price: profile.max_profit_price,
            profit_zone_width: profile.profit_zone_width,
            probability_of_profit: profile.probability_of_profit,
            avg_pnl_leverage: avg_pnl_leverage(totals.average_pnl, totals.premium),
            ..StrategyMetrics::default()
        };

        let mut iv_sum = 0.0;
        for leg in legs {
            let inst = self.cache.instrument(leg.index);
            let s = leg.direction.sign();
            metrics.total_gamma += s * inst.gamma;
            metrics.total_vega += s * inst.vega;
            metrics.total_theta += s * inst.theta;
            metrics.total_iv += s * inst.implied_volatility;
            metrics.total_sigma_pnl += s * inst.sigma_pnl;
            metrics.total_roll += s * inst.roll;
            metrics.total_roll_quarterly += s * inst.roll_quarterly;
            metrics.total_roll_sum += s * inst.roll_sum;
            metrics.total_tail_penalty += s * inst.tail_penalty;
            iv_sum += inst.implied_volatility;
            if inst.is_call() {
                metrics.call_count += 1;
            } else {
                metrics.put_count += 1;
            }
            for t in 0..N_INTRA_DATES {
                metrics.intra_life_prices[t] += s * inst.intra_life_prices[t];
                metrics.intra_life_pnl[t] += s * inst.intra_life_pnl[t];
            }
        }
        if !legs.is_empty() {
            metrics.avg_implied_volatility = iv_sum / legs.len() as f64;
        }
        metrics.avg_intra_life_pnl = metrics.intra_life_pnl.iter().sum::<f64>() / N_INTRA_DATES as f64;

        Ok(Candidate {
            legs: legs.iter().map(|&leg| LegView::resolve(self.cache, leg)).collect(),
            metrics,
        })
    }
}
