//! Scalar rejection filters and the running totals they operate on.
//!
//! The same [`ScalarTotals`] drive both the evaluator's filter chain and
//! the branch-and-bound reachability bound, so a pruned subtree can never
//! contain a leaf the evaluator would have accepted on these tests.

use serde::{Deserialize, Serialize};

use super::constraints::SearchConstraints;
use super::leg::LegDirection;
use crate::universe::{Instrument, UniverseBounds};

/// Slack applied to reachability comparisons so summation rounding can
/// never prune a feasible leaf.
const BOUND_SLACK: f64 = 1.0e-9;

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// A short leg's premium is below `min_premium_sell`.
    UselessSell,
    /// Same (type, strike) bought and sold.
    RedundantHedge,
    /// Net open puts above `ouvert_gauche`.
    PutsOpen,
    /// Net open calls above `ouvert_droite`.
    CallsOpen,
    /// |net premium| above `max_premium`.
    Premium,
    /// Net delta outside the band.
    Delta,
    /// Negative net average P&L.
    AveragePnl,
    /// Loss limit breached left of `limit_left`.
    LossLeft,
    /// Loss limit breached right of `limit_right`.
    LossRight,
    /// Loss beyond |net premium| between the limits.
    LossCenter,
    /// Global worst loss beyond |net premium| in premium-only mode.
    PremiumOnly,
}

impl RejectReason {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UselessSell => "useless_sell",
            Self::RedundantHedge => "redundant_hedge",
            Self::PutsOpen => "puts_open",
            Self::CallsOpen => "calls_open",
            Self::Premium => "premium",
            Self::Delta => "delta",
            Self::AveragePnl => "average_pnl",
            Self::LossLeft => "loss_left",
            Self::LossRight => "loss_right",
            Self::LossCenter => "loss_center",
            Self::PremiumOnly => "premium_only",
        }
    }
}

/// Aggregate rejection tallies for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    /// [`RejectReason::UselessSell`].
    pub useless_sell: u64,
    /// [`RejectReason::RedundantHedge`].
    pub redundant_hedge: u64,
    /// [`RejectReason::PutsOpen`].
    pub puts_open: u64,
    /// [`RejectReason::CallsOpen`].
    pub calls_open: u64,
    /// [`RejectReason::Premium`].
    pub premium: u64,
    /// [`RejectReason::Delta`].
    pub delta: u64,
    /// [`RejectReason::AveragePnl`].
    pub average_pnl: u64,
    /// [`RejectReason::LossLeft`].
    pub loss_left: u64,
    /// [`RejectReason::LossRight`].
    pub loss_right: u64,
    /// [`RejectReason::LossCenter`].
    pub loss_center: u64,
    /// [`RejectReason::PremiumOnly`].
    pub premium_only: u64,
}

impl RejectionCounts {
    /// Count one rejection.
    pub fn record(&mut self, reason: RejectReason) {
        *self.slot(reason) += 1;
    }

    /// Tally for a reason.
    #[must_use]
    pub const fn get(&self, reason: RejectReason) -> u64 {
        match reason {
            RejectReason::UselessSell => self.useless_sell,
            RejectReason::RedundantHedge => self.redundant_hedge,
            RejectReason::PutsOpen => self.puts_open,
            RejectReason::CallsOpen => self.calls_open,
            RejectReason::Premium => self.premium,
            RejectReason::Delta => self.delta,
            RejectReason::AveragePnl => self.average_pnl,
            RejectReason::LossLeft => self.loss_left,
            RejectReason::LossRight => self.loss_right,
            RejectReason::LossCenter => self.loss_center,
            RejectReason::PremiumOnly => self.premium_only,
        }
    }

    const fn slot(&mut self, reason: RejectReason) -> &mut u64 {
        match reason {
            RejectReason::UselessSell => &mut self.useless_sell,
            RejectReason::RedundantHedge => &mut self.redundant_hedge,
            RejectReason::PutsOpen => &mut self.puts_open,
            RejectReason::CallsOpen => &mut self.calls_open,
            RejectReason::Premium => &mut self.premium,
            RejectReason::Delta => &mut self.delta,
            RejectReason::AveragePnl => &mut self.average_pnl,
            RejectReason::LossLeft => &mut self.loss_left,
            RejectReason::LossRight => &mut self.loss_right,
            RejectReason::LossCenter => &mut self.loss_center,
            RejectReason::PremiumOnly => &mut self.premium_only,
        }
    }

    /// Add another worker's tallies.
    pub const fn merge(&mut self, other: &Self) {
        self.useless_sell += other.useless_sell;
        self.redundant_hedge += other.redundant_hedge;
        self.puts_open += other.puts_open;
        self.calls_open += other.calls_open;
        self.premium += other.premium;
        self.delta += other.delta;
        self.average_pnl += other.average_pnl;
        self.loss_left += other.loss_left;
        self.loss_right += other.loss_right;
        self.loss_center += other.loss_center;
        self.premium_only += other.premium_only;
    }

    /// Sum over all reasons.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.useless_sell
            + self.redundant_hedge
            + self.puts_open
            + self.calls_open
            + self.premium
            + self.delta
            + self.average_pnl
            + self.loss_left
            + self.loss_right
            + self.loss_center
            + self.premium_only
    }

    /// Non-zero tallies with their labels.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        [
            RejectReason::UselessSell,
            RejectReason::RedundantHedge,
            RejectReason::PutsOpen,
            RejectReason::CallsOpen,
            RejectReason::Premium,
            RejectReason::Delta,
            RejectReason::AveragePnl,
            RejectReason::LossLeft,
            RejectReason::LossRight,
            RejectReason::LossCenter,
            RejectReason::PremiumOnly,
        ]
        .into_iter()
        .map(|r| (r.as_str(), self.get(r)))
        .filter(|(_, n)| *n > 0)
    }
}

/// Sign-weighted scalar aggregates of a (partial) leg set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScalarTotals {
    /// Σ sign · premium.
    pub premium: f64,
    /// Σ sign · delta.
    pub delta: f64,
    /// Σ sign · average_pnl.
    pub average_pnl: f64,
    /// Short puts minus long puts.
    pub open_puts: i32,
    /// Short calls minus long calls.
    pub open_calls: i32,
}

impl ScalarTotals {
    /// Totals after adding one leg.
    #[inline]
    #[must_use]
    pub fn with_leg(mut self, inst: &Instrument, direction: LegDirection) -> Self {
        let s = direction.sign();
        self.premium += s * inst.premium;
        self.delta += s * inst.delta;
        self.average_pnl += s * inst.average_pnl;
        let open = match direction {
            LegDirection::Short => 1,
            LegDirection::Long => -1,
        };
        if inst.is_call() {
            self.open_calls += open;
        } else {
            self.open_puts += open;
        }
        self
    }

    /// Apply the scalar filters in evaluation order.
    pub fn check(&self, c: &SearchConstraints) -> Result<(), RejectReason> {
        if self.open_puts > c.ouvert_gauche {
            return Err(RejectReason::PutsOpen);
        }
        if self.open_calls > c.ouvert_droite {
            return Err(RejectReason::CallsOpen);
        }
        if self.premium.abs() > c.max_premium {
            return Err(RejectReason::Premium);
        }
        if self.delta < c.delta_min || self.delta > c.delta_max {
            return Err(RejectReason::Delta);
        }
        if self.average_pnl < 0.0 {
            return Err(RejectReason::AveragePnl);
        }
        Ok(())
    }

    /// Whether adding up to `remaining` more legs could still pass
    /// [`Self::check`].
    ///
    /// Each extra leg moves premium, delta and average P&L by at most the
    /// universe maxima and each open count by at most one, so every test is
    /// relaxed by `remaining` times that amount.
    #[must_use]
    pub fn can_reach(&self, remaining: usize, bounds: &UniverseBounds, c: &SearchConstraints) -> bool {
        let r = remaining as f64;
        let r_i = i32::try_from(remaining).unwrap_or(i32::MAX);

        if self.open_puts.saturating_sub(r_i) > c.ouvert_gauche {
            return false;
        }
        if self.open_calls.saturating_sub(r_i) > c.ouvert_droite {
            return false;
        }

        let premium_reach = r.mul_add(bounds.max_premium, BOUND_SLACK);
        if self.premium.abs() - premium_reach > c.max_premium {
            return false;
        }

        let delta_reach = r.mul_add(bounds.max_abs_delta, BOUND_SLACK);
        if self.delta + delta_reach < c.delta_min || self.delta - delta_reach > c.delta_max {
            return false;
        }

        let pnl_reach = r.mul_add(bounds.max_abs_average_pnl, BOUND_SLACK);
        self.average_pnl + pnl_reach >= 0.0
    }
}
