//! End-to-end search scenarios through the public session API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use strategy_engine::enumerator::{collect_candidates, work_units};
use strategy_engine::evaluator::LegDirection;
use strategy_engine::{
    CancelFlag, EngineSession, EnumerationMode, InstrumentRow, ParallelConfig, RejectReason,
    SearchConstraints, SearchError, SearchRequest, UniverseCache, UniverseInput, WeightSet,
};

// =============================================================================
// Fixtures
// =============================================================================

const GRID: [f64; 5] = [80.0, 90.0, 100.0, 110.0, 120.0];

fn vanilla(strike: f64, is_call: bool, premium: f64, delta: f64) -> InstrumentRow {
    let pnl = GRID
        .iter()
        .map(|&p| {
            let intrinsic = if is_call { p - strike } else { strike - p };
            intrinsic.max(0.0) - premium
        })
        .collect();
    InstrumentRow {
        premium,
        delta,
        strike,
        is_call,
        pnl,
        ..InstrumentRow::default()
    }
}

/// Call 100 @ 2.0, put 100 @ 2.0, call 110 @ 1.0.
fn three_instrument_universe() -> UniverseInput {
    UniverseInput::over_grid(GRID.to_vec(), vec![0.2; GRID.len()], 100.0)
        .with_instrument(vanilla(100.0, true, 2.0, 0.5))
        .with_instrument(vanilla(100.0, false, 2.0, -0.5))
        .with_instrument(vanilla(110.0, true, 1.0, 0.3))
}

fn pnl_weights() -> WeightSet {
    WeightSet::new("pnl").with_weight("average_pnl", 1.0)
}

fn session_with(input: UniverseInput) -> EngineSession {
    let session = EngineSession::new();
    session.init(input).unwrap();
    session
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_call_put_pair_is_not_a_redundant_hedge() {
    let cache = UniverseCache::from_input(three_instrument_universe()).unwrap();
    let pool = collect_candidates(
        &cache,
        &SearchConstraints::default(),
        2,
        EnumerationMode::Exhaustive,
        &CancelFlag::new(),
        &ParallelConfig::default(),
    )
    .unwrap();

    let pair = pool
        .candidates
        .iter()
        .find(|c| {
            c.legs.len() == 2
                && c.legs[0].index == 0
                && c.legs[0].direction == LegDirection::Long
                && c.legs[1].index == 1
                && c.legs[1].direction == LegDirection::Short
        })
        .expect("long call 100 / short put 100 survives");

    let expected = LegDirection::Long.sign() * 2.0 + LegDirection::Short.sign() * 2.0;
    assert_eq!(pair.metrics.total_premium, expected);
    // Only an instrument paired with itself in opposite directions is a
    // redundant hedge: three instruments, two mixed sign masks each.
    assert_eq!(pool.diagnostics.rejections.get(RejectReason::RedundantHedge), 6);
}

#[test]
fn test_repeated_instrument_legs_in_both_modes() {
    let cache = UniverseCache::from_input(three_instrument_universe()).unwrap();
    for mode in [EnumerationMode::Exhaustive, EnumerationMode::BranchAndBound] {
        let pool = collect_candidates(
            &cache,
            &SearchConstraints::default(),
            2,
            mode,
            &CancelFlag::new(),
            &ParallelConfig::default(),
        )
        .unwrap();

        let doubled = pool
            .candidates
            .iter()
            .find(|c| {
                c.legs.len() == 2
                    && c.legs.iter().all(|l| l.index == 0 && l.direction == LegDirection::Long)
            })
            .expect("2x long call 100 is generated");
        assert_eq!(doubled.metrics.total_premium, 4.0);
        assert_eq!(doubled.metrics.call_count, 2);

        let self_hedged = pool.candidates.iter().any(|c| {
            c.legs.len() == 2 && c.legs[0].index == c.legs[1].index && c.legs[0].direction != c.legs[1].direction
        });
        assert!(!self_hedged, "{mode}: same instrument bought and sold");
    }
}

#[test]
fn test_short_below_min_sell_premium_is_rejected() {
    let input = UniverseInput::over_grid(GRID.to_vec(), vec![0.2; GRID.len()], 100.0)
        .with_instrument(vanilla(100.0, true, 5.0, 0.5));
    let session = session_with(input);

    let constraints = SearchConstraints {
        min_premium_sell: 6.0,
        ..SearchConstraints::default()
    };
    let request = SearchRequest::new(1, pnl_weights())
        .with_constraints(constraints)
        .with_dedup(false);
    let response = session.search(&request).unwrap();

    assert_eq!(response.diagnostics.rejections.get(RejectReason::UselessSell), 1);
    for list in response.per_set.iter().chain([&response.consensus]) {
        assert!(list.strategies.iter().all(|s| s.signs == vec![1]));
    }
}

#[test]
fn test_breakeven_and_profit_zone() {
    let input = UniverseInput::over_grid(vec![90.0, 95.0, 100.0, 105.0], vec![0.25; 4], 97.5)
        .with_instrument(InstrumentRow {
            premium: 3.0,
            delta: 0.6,
            average_pnl: 0.5,
            strike: 97.0,
            is_call: true,
            pnl: vec![-3.0, -1.0, 2.0, 5.0],
            ..InstrumentRow::default()
        });
    let session = session_with(input);
    let response = session
        .search(&SearchRequest::new(1, pnl_weights()))
        .unwrap();

    // The short leg has negative average P&L and is rejected.
    assert_eq!(response.n_candidates, 1);
    let strategy = &response.per_set[0].strategies[0];
    assert_eq!(strategy.pnl_curve, vec![-3.0, -1.0, 2.0, 5.0]);

    let m = &strategy.metrics;
    assert_eq!(m.breakeven_points.len(), 1);
    assert!((m.breakeven_points[0] - (95.0 + 5.0 / 3.0)).abs() < 1e-9);
    assert_eq!(m.min_profit_price, 100.0);
    assert_eq!(m.max_profit_price, 105.0);
    assert_eq!(m.profit_zone_width, 5.0);
    assert_eq!(m.max_profit, 5.0);
    assert_eq!(m.max_loss, -3.0);
}

#[test]
fn test_top_n_larger_than_pool_returns_everything() {
    let session = session_with(three_instrument_universe());
    let constraints = SearchConstraints {
        min_premium_sell: 100.0,
        ..SearchConstraints::default()
    };
    let request = SearchRequest::new(1, pnl_weights())
        .with_constraints(constraints)
        .with_top_n(5);
    let response = session.search(&request).unwrap();

    assert_eq!(response.n_candidates, 3);
    assert_eq!(response.n_weight_sets, 1);
    for list in response.per_set.iter().chain([&response.consensus]) {
        let ranks: Vec<usize> = list.strategies.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}

// =============================================================================
// Preconditions and lifecycle
// =============================================================================

#[test]
fn test_uninitialized_cache() {
    let session = EngineSession::new();
    let err = session.search(&SearchRequest::new(1, pnl_weights())).unwrap_err();
    assert!(matches!(err, SearchError::UninitializedCache));
    assert_eq!(err.code().reason(), "UNINITIALIZED_CACHE");
}

#[test]
fn test_leg_count_out_of_range() {
    let session = session_with(three_instrument_universe());
    for max_legs in [0, 4] {
        let err = session
            .search(&SearchRequest::new(max_legs, pnl_weights()))
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidLegCount { max_allowed: 3, .. }));
    }
}

#[test]
fn test_empty_weight_sets() {
    let session = session_with(three_instrument_universe());
    let mut request = SearchRequest::new(2, pnl_weights());
    request.weight_sets.clear();
    assert!(matches!(
        session.search(&request),
        Err(SearchError::EmptyWeightSets)
    ));
}

#[test]
fn test_cancellation_persists_until_reset() {
    let session = session_with(three_instrument_universe());
    let request = SearchRequest::new(2, pnl_weights());

    session.request_stop();
    assert!(session.search(&request).unwrap_err().is_cancelled());
    // A search never lowers the flag itself.
    assert!(session.is_stop_requested());
    assert!(session.search(&request).unwrap_err().is_cancelled());

    session.reset_stop();
    assert!(session.search(&request).is_ok());
}

/// Sixty vanilla options, far too many to finish five-leg searches quickly.
fn wide_universe() -> UniverseInput {
    (0..60).fold(
        UniverseInput::over_grid(GRID.to_vec(), vec![0.2; GRID.len()], 100.0),
        |input, i| {
            let strike = 70.0 + f64::from(i);
            input.with_instrument(vanilla(strike, i % 2 == 0, 1.0 + 0.01 * f64::from(i), 0.0))
        },
    )
}

fn assert_stop_interrupts_running_search(mode: EnumerationMode) {
    let session = Arc::new(session_with(wide_universe()));
    let request = SearchRequest::new(5, pnl_weights()).with_mode(mode);
    let worker = Arc::clone(&session);
    let search = thread::spawn(move || worker.search(&request));

    thread::sleep(Duration::from_millis(50));
    assert!(!search.is_finished(), "{mode}: search ended before the stop request");
    session.request_stop();

    let outcome = search.join().expect("search thread panicked");
    assert!(matches!(outcome, Err(SearchError::Cancelled)));
    assert!(session.is_stop_requested());

    session.reset_stop();
    let single = SearchRequest::new(1, pnl_weights()).with_mode(mode);
    assert_eq!(session.search(&single).unwrap().n_candidates, 120);
}

#[test]
fn test_stop_during_exhaustive_search() {
    assert_stop_interrupts_running_search(EnumerationMode::Exhaustive);
}

#[test]
fn test_stop_during_branch_and_bound_search() {
    assert_stop_interrupts_running_search(EnumerationMode::BranchAndBound);
}

#[test]
fn test_exhaustive_unit_accounting() {
    let session = session_with(three_instrument_universe());
    let response = session
        .search(&SearchRequest::new(3, pnl_weights()))
        .unwrap();

    let d = &response.diagnostics;
    assert_eq!(d.per_leg_count.len(), 3);
    for stats in &d.per_leg_count {
        assert_eq!(stats.units, work_units(3, stats.legs));
        assert_eq!(stats.valid + stats.rejected, stats.units);
    }
    // C(3,1)·2 + C(4,2)·4 + C(5,3)·8
    assert_eq!(d.units_evaluated, 6 + 24 + 80);
    assert_eq!(d.valid_total(), response.n_candidates as u64);
    assert_eq!(d.rejections.total() + d.valid_total(), d.units_evaluated);
}

#[test]
fn test_multiple_weight_sets_and_consensus() {
    let session = session_with(three_instrument_universe());
    let request = SearchRequest::new(2, pnl_weights())
        .with_weight_set(WeightSet::new("safe").with_weight("max_loss", 1.0))
        .with_top_n(4);
    let response = session.search(&request).unwrap();

    assert_eq!(response.n_weight_sets, 2);
    assert!(response.ranking("pnl").is_some());
    assert!(response.ranking("safe").is_some());
    assert_eq!(response.consensus.name, "consensus");
    for list in response.per_set.iter().chain([&response.consensus]) {
        assert!(list.strategies.len() <= 4);
        assert!(list.strategies.windows(2).all(|w| w[0].score >= w[1].score));
        for s in &list.strategies {
            assert_eq!(s.pnl_curve.len(), GRID.len());
            assert_eq!(s.signs.len(), s.leg_count());
        }
    }

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["n_weight_sets"], 2);
}
