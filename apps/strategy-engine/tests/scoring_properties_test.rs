//! Properties of the multi-configuration scorer.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use strategy_engine::evaluator::StrategyMetrics;
use strategy_engine::scoring::{ResolvedWeights, score_pool};
use strategy_engine::{Candidate, MetricId, WeightSet};

fn candidate(average_pnl: f64, max_loss: f64, theta: f64) -> Candidate {
    Candidate {
        legs: Vec::new(),
        metrics: StrategyMetrics {
            total_average_pnl: average_pnl,
            max_loss,
            total_theta: theta,
            total_roll: 0.7,
            ..StrategyMetrics::default()
        },
    }
}

fn pool() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec(
        (-5.0f64..5.0, -20.0f64..0.0, -1.0f64..1.0).prop_map(|(a, l, t)| candidate(a, l, t)),
        1..40,
    )
}

fn weights() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.0f64..4.0, 0.0f64..4.0, 0.0f64..4.0)
}

fn resolve(name: &str, (a, l, t): (f64, f64, f64), scale: f64) -> ResolvedWeights {
    WeightSet::new(name)
        .with_weight(MetricId::AveragePnl.name(), a * scale)
        .with_weight(MetricId::MaxLoss.name(), l * scale)
        .with_weight(MetricId::ThetaPositive.name(), t * scale)
        .resolve()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scaling_weights_keeps_ranking(
        candidates in pool(),
        w in weights(),
        exponent in -4i32..=4,
    ) {
        // Power-of-two factors scale exactly, so renormalized weights match bit for bit.
        let scale = 2f64.powi(exponent);
        let base = score_pool(&candidates, &[resolve("base", w, 1.0)], candidates.len());
        let scaled = score_pool(&candidates, &[resolve("scaled", w, scale)], candidates.len());

        let a: Vec<usize> = base.per_set[0].entries.iter().map(|e| e.index).collect();
        let b: Vec<usize> = scaled.per_set[0].entries.iter().map(|e| e.index).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn constant_metric_does_not_change_order(candidates in pool(), w in weights()) {
        let base = resolve("base", w, 1.0);
        let with_roll = {
            let (a, l, t) = w;
            WeightSet::new("with_roll")
                .with_weight("average_pnl", a)
                .with_weight("max_loss", l)
                .with_weight("theta_positive", t)
                .with_weight("roll", 1.0)
                .resolve()
                .unwrap()
        };
        // Skip the all-zero base: it scores 0 everywhere while the roll set does not.
        prop_assume!(!base.is_zero());

        let result = score_pool(&candidates, &[base, with_roll], candidates.len());
        let a: Vec<usize> = result.per_set[0].entries.iter().map(|e| e.index).collect();
        let b: Vec<usize> = result.per_set[1].entries.iter().map(|e| e.index).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn ranks_are_dense_and_scores_sorted(candidates in pool(), w in weights(), keep in 1usize..10) {
        let result = score_pool(&candidates, &[resolve("w", w, 1.0)], keep);
        for ranking in result.per_set.iter().chain([&result.consensus]) {
            prop_assert_eq!(ranking.entries.len(), keep.min(candidates.len()));
            for (i, e) in ranking.entries.iter().enumerate() {
                prop_assert_eq!(e.rank, i + 1);
            }
            prop_assert!(ranking.entries.windows(2).all(|p| p[0].score >= p[1].score));
        }
    }
}
