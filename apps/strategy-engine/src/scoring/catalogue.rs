//! Scoring metric catalogue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::evaluator::StrategyMetrics;

/// How a metric's observed values map to a `[lo, hi]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Normalizer {
    /// `[0, max]`.
    Max,
    /// `[min, max]`.
    MinMax,
}

impl Normalizer {
    /// Range from observed extrema. Degenerate ranges are widened by one.
    #[must_use]
    pub fn range(self, min: f64, max: f64) -> (f64, f64) {
        let lo = match self {
            Self::Max => 0.0,
            Self::MinMax => min,
        };
        let hi = if max > lo { max } else { lo + 1.0 };
        (lo, hi)
    }
}

/// Which end of the range scores best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Score rises with the value.
    HigherIsBetter,
    /// Score falls with the value.
    LowerIsBetter,
    /// Peak at the middle of the range.
    ModerateIsBetter,
    /// Linear ramp, zero for negative values.
    PositiveIsBetter,
}

impl Direction {
    /// Sub-score in `[0, 1]` of `value` within `[lo, hi]` (`hi > lo`).
    #[must_use]
    pub fn sub_score(self, value: f64, lo: f64, hi: f64) -> f64 {
        let t = (value - lo) / (hi - lo);
        match self {
            Self::HigherIsBetter => t.clamp(0.0, 1.0),
            Self::LowerIsBetter => (1.0 - t).clamp(0.0, 1.0),
            Self::ModerateIsBetter => 2.0f64.mul_add(-(t - 0.5).abs(), 1.0).max(0.0),
            Self::PositiveIsBetter => {
                if value >= 0.0 {
                    t.clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Catalogue metrics, addressable by name in weight maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricId {
    /// |net delta|.
    DeltaNeutral,
    /// |net gamma|.
    GammaLow,
    /// |net vega|.
    VegaLow,
    /// Net theta.
    ThetaPositive,
    /// |net premium|.
    Premium,
    /// Mean implied volatility.
    ImpliedVolModerate,
    /// Net average P&L.
    AveragePnl,
    /// Net roll.
    Roll,
    /// Net previous-quarter roll.
    RollQuarterly,
    /// Net sigma P&L.
    SigmaPnl,
    /// Average P&L per unit of premium.
    AvgPnlLeverage,
    /// |worst loss|.
    MaxLoss,
    /// |net tail penalty|.
    TailPenalty,
    /// Mean intra-life P&L.
    AvgIntraLifePnl,
}

impl MetricId {
    /// Every catalogue metric in declaration order.
    pub const ALL: [Self; 14] = [
        Self::DeltaNeutral,
        Self::GammaLow,
        Self::VegaLow,
        Self::ThetaPositive,
        Self::Premium,
        Self::ImpliedVolModerate,
        Self::AveragePnl,
        Self::Roll,
        Self::RollQuarterly,
        Self::SigmaPnl,
        Self::AvgPnlLeverage,
        Self::MaxLoss,
        Self::TailPenalty,
        Self::AvgIntraLifePnl,
    ];

    /// Weight-map name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeltaNeutral => "delta_neutral",
            Self::GammaLow => "gamma_low",
            Self::VegaLow => "vega_low",
            Self::ThetaPositive => "theta_positive",
            Self::Premium => "premium",
            Self::ImpliedVolModerate => "implied_vol_moderate",
            Self::AveragePnl => "average_pnl",
            Self::Roll => "roll",
            Self::RollQuarterly => "roll_quarterly",
            Self::SigmaPnl => "sigma_pnl",
            Self::AvgPnlLeverage => "avg_pnl_leverage",
            Self::MaxLoss => "max_loss",
            Self::TailPenalty => "tail_penalty",
            Self::AvgIntraLifePnl => "avg_intra_life_pnl",
        }
    }

    /// Normalization and direction.
    #[must_use]
    pub const fn behavior(self) -> (Normalizer, Direction) {
        use Direction::{HigherIsBetter, LowerIsBetter, ModerateIsBetter};
        use Normalizer::{Max, MinMax};
        match self {
            Self::DeltaNeutral | Self::GammaLow | Self::VegaLow => (Max, LowerIsBetter),
            Self::ThetaPositive => (MinMax, HigherIsBetter),
            Self::Premium => (Max, LowerIsBetter),
            Self::ImpliedVolModerate => (MinMax, ModerateIsBetter),
            Self::AveragePnl | Self::Roll | Self::RollQuarterly => (MinMax, HigherIsBetter),
            Self::SigmaPnl => (Max, LowerIsBetter),
            Self::AvgPnlLeverage => (Max, HigherIsBetter),
            Self::MaxLoss => (Max, LowerIsBetter),
            Self::TailPenalty => (MinMax, LowerIsBetter),
            Self::AvgIntraLifePnl => (MinMax, HigherIsBetter),
        }
    }

    /// Raw value for a candidate; non-finite values read as 0.
    #[must_use]
    pub fn extract(self, m: &StrategyMetrics) -> f64 {
        let value = match self {
            Self::DeltaNeutral => m.total_delta.abs(),
            Self::GammaLow => m.total_gamma.abs(),
            Self::VegaLow => m.total_vega.abs(),
            Self::ThetaPositive => m.total_theta,
            Self::Premium => m.total_premium.abs(),
            Self::ImpliedVolModerate => m.avg_implied_volatility,
            Self::AveragePnl => m.total_average_pnl,
            Self::Roll => m.total_roll,
            Self::RollQuarterly => m.total_roll_quarterly,
            Self::SigmaPnl => m.total_sigma_pnl,
            Self::AvgPnlLeverage => m.avg_pnl_leverage,
            Self::MaxLoss => m.worst_loss().abs(),
            Self::TailPenalty => m.total_tail_penalty.abs(),
            Self::AvgIntraLifePnl => m.avg_intra_life_pnl,
        };
        if value.is_finite() { value } else { 0.0 }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name outside the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetricName(pub String);

impl FromStr for MetricId {
    type Err = UnknownMetricName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The historical spelling is kept as an alias.
        if s == "avg_pnl_levrage" {
            return Ok(Self::AvgPnlLeverage);
        }
        Self::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| UnknownMetricName(s.to_string()))
    }
}

/// A catalogue metric with its weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    /// Metric.
    pub id: MetricId,
    /// Weight (renormalized per configuration).
    pub weight: f64,
    /// Range rule.
    pub normalizer: Normalizer,
    /// Scoring direction.
    pub direction: Direction,
}

impl MetricSpec {
    /// Catalogue entry with the given weight.
    #[must_use]
    pub const fn new(id: MetricId, weight: f64) -> Self {
        let (normalizer, direction) = id.behavior();
        Self {
            id,
            weight,
            normalizer,
            direction,
        }
    }
}

/// Default configuration: every catalogue metric at weight 0.
#[must_use]
pub fn default_metrics() -> Vec<MetricSpec> {
    MetricId::ALL.into_iter().map(|id| MetricSpec::new(id, 0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_names_roundtrip() {
        for id in MetricId::ALL {
            assert_eq!(id.name().parse::<MetricId>(), Ok(id));
        }
        assert_eq!("avg_pnl_levrage".parse::<MetricId>(), Ok(MetricId::AvgPnlLeverage));
        assert!("sharpe".parse::<MetricId>().is_err());
    }

    #[test]
    fn test_defaults_are_unweighted() {
        let defaults = default_metrics();
        assert_eq!(defaults.len(), MetricId::ALL.len());
        assert!(defaults.iter().all(|m| m.weight == 0.0));
        assert_eq!(MetricId::TailPenalty.behavior(), (Normalizer::MinMax, Direction::LowerIsBetter));
    }

    #[test]
    fn test_degenerate_ranges_are_widened() {
        assert_eq!(Normalizer::MinMax.range(3.0, 3.0), (3.0, 4.0));
        assert_eq!(Normalizer::Max.range(-1.0, 0.0), (0.0, 1.0));
        assert_eq!(Normalizer::Max.range(1.0, 5.0), (0.0, 5.0));
    }

    #[test_case(Direction::HigherIsBetter, 7.5, 0.75 ; "higher")]
    #[test_case(Direction::LowerIsBetter, 7.5, 0.25 ; "lower")]
    #[test_case(Direction::ModerateIsBetter, 5.0, 1.0 ; "moderate at midpoint")]
    #[test_case(Direction::ModerateIsBetter, 10.0, 0.0 ; "moderate at edge")]
    #[test_case(Direction::PositiveIsBetter, 2.5, 0.25 ; "positive ramp")]
    #[test_case(Direction::HigherIsBetter, 12.0, 1.0 ; "clamped above")]
    fn test_sub_scores(direction: Direction, value: f64, expected: f64) {
        assert!((direction.sub_score(value, 0.0, 10.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_positive_is_gated() {
        assert_eq!(Direction::PositiveIsBetter.sub_score(-1.0, -5.0, 5.0), 0.0);
    }

    #[test]
    fn test_extract_uses_magnitudes_and_zeroes_nan() {
        let m = StrategyMetrics {
            total_delta: -0.4,
            max_loss: -3.0,
            total_theta: f64::NAN,
            ..StrategyMetrics::default()
        };
        assert_eq!(MetricId::DeltaNeutral.extract(&m), 0.4);
        assert_eq!(MetricId::MaxLoss.extract(&m), 3.0);
        assert_eq!(MetricId::ThetaPositive.extract(&m), 0.0);
    }
}
