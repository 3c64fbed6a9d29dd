//! Immutable, search-ready view of an options universe.

use super::error::UniverseError;
use super::input::UniverseInput;
use super::instrument::{Instrument, N_INTRA_DATES, OptionType};

/// Universe-wide extrema used by branch-and-bound pruning.
///
/// Computed once at load; every bound derived from these is conservative
/// because no single leg can move an aggregate by more than these amounts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UniverseBounds {
    /// max |premium| over all instruments.
    pub max_premium: f64,
    /// max |delta| over all instruments.
    pub max_abs_delta: f64,
    /// max |average_pnl| over all instruments.
    pub max_abs_average_pnl: f64,
}

/// Options universe cache.
///
/// P&L rows are stored contiguously, instrument-major, in a single buffer so
/// that accumulating a candidate's curve walks memory linearly.
#[derive(Debug, Clone)]
pub struct UniverseCache {
    instruments: Vec<Instrument>,
    pnl_flat: Vec<f64>,
    prices: Vec<f64>,
    mixture: Vec<f64>,
    average_mix: f64,
    bounds: UniverseBounds,
}

impl UniverseCache {
    /// Validate and pack a universe payload.
    pub fn from_input(input: UniverseInput) -> Result<Self, UniverseError> {
        input.validate()?;

        let n = input.len();
        let grid_len = input.prices.len();
        let column = |values: Option<&Vec<f64>>, i: usize| values.map_or(0.0, |v| v[i]);

        let mut instruments = Vec::with_capacity(n);
        for i in 0..n {
            let premium = input.premiums[i];
            let intra_life_prices = input
                .intra_life_prices
                .as_ref()
                .map_or([premium; N_INTRA_DATES], |rows| to_checkpoints(&rows[i]));
            let intra_life_pnl = input
                .intra_life_pnl
                .as_ref()
                .map_or([0.0; N_INTRA_DATES], |rows| to_checkpoints(&rows[i]));

            instruments.push(Instrument {
                premium,
                delta: input.deltas[i],
                gamma: column(input.gammas.as_ref(), i),
                vega: column(input.vegas.as_ref(), i),
                theta: column(input.thetas.as_ref(), i),
                implied_volatility: input.ivs[i],
                average_pnl: input.average_pnls[i],
                sigma_pnl: column(input.sigma_pnls.as_ref(), i),
                strike: input.strikes[i],
                option_type: OptionType::from_is_call(input.is_calls[i]),
                roll: input.rolls[i],
                roll_quarterly: column(input.roll_quarterlies.as_ref(), i),
                roll_sum: column(input.roll_sums.as_ref(), i),
                tail_penalty: column(input.tail_penalties.as_ref(), i),
                intra_life_prices,
                intra_life_pnl,
            });
        }

        let mut pnl_flat = Vec::with_capacity(n * grid_len);
        for row in &input.pnl_matrix {
            pnl_flat.extend_from_slice(row);
        }

        let bounds = compute_bounds(&instruments);

        Ok(Self {
            instruments,
            pnl_flat,
            prices: input.prices,
            mixture: input.mixture,
            average_mix: input.average_mix,
            bounds,
        })
    }

    /// Number of instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Whether the universe is empty (never true for a loaded cache).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// All instruments in load order.
    #[must_use]
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Instrument by index.
    #[inline]
    #[must_use]
    pub fn instrument(&self, index: u32) -> &Instrument {
        &self.instruments[index as usize]
    }

    /// Borrowed P&L row of an instrument.
    #[inline]
    #[must_use]
    pub fn pnl_row(&self, index: u32) -> &[f64] {
        let len = self.prices.len();
        let start = index as usize * len;
        &self.pnl_flat[start..start + len]
    }

    /// Shared price grid.
    #[must_use]
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Mixture density aligned with the grid.
    #[must_use]
    pub fn mixture(&self) -> &[f64] {
        &self.mixture
    }

    /// Number of grid points.
    #[must_use]
    pub fn grid_len(&self) -> usize {
        self.prices.len()
    }

    /// Split point between the left and right regions.
    #[must_use]
    pub const fn average_mix(&self) -> f64 {
        self.average_mix
    }

    /// Universe-wide extrema for pruning.
    #[must_use]
    pub const fn bounds(&self) -> &UniverseBounds {
        &self.bounds
    }
}

fn to_checkpoints(row: &[f64]) -> [f64; N_INTRA_DATES] {
    let mut out = [0.0; N_INTRA_DATES];
    out.copy_from_slice(&row[..N_INTRA_DATES]);
    out
}

fn compute_bounds(instruments: &[Instrument]) -> UniverseBounds {
    instruments
        .iter()
        .fold(UniverseBounds::default(), |acc, inst| UniverseBounds {
            max_premium: acc.max_premium.max(inst.premium.abs()),
            max_abs_delta: acc.max_abs_delta.max(inst.delta.abs()),
            max_abs_average_pnl: acc.max_abs_average_pnl.max(inst.average_pnl.abs()),
        })
}
