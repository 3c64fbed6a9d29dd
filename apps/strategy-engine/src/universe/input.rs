//! Load-time representation of an options universe.
//!
//! The binding layer hands the engine parallel arrays (one entry per
//! instrument) plus a P&L matrix over a shared price grid. This mirrors the
//! column layout produced by the upstream pricer, so no reshaping happens
//! on the caller's side.

use serde::{Deserialize, Serialize};

use super::error::UniverseError;
use super::instrument::N_INTRA_DATES;

/// Parallel-array universe payload accepted by
/// [`crate::session::EngineSession::init`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniverseInput {
    /// Premium per instrument.
    pub premiums: Vec<f64>,
    /// Delta per instrument.
    pub deltas: Vec<f64>,
    /// Implied volatility per instrument.
    pub ivs: Vec<f64>,
    /// Average expected P&L per instrument.
    pub average_pnls: Vec<f64>,
    /// Strike per instrument.
    pub strikes: Vec<f64>,
    /// Call flag per instrument.
    pub is_calls: Vec<bool>,
    /// Normalized roll per instrument.
    pub rolls: Vec<f64>,

    /// Gamma per instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gammas: Option<Vec<f64>>,
    /// Vega per instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegas: Option<Vec<f64>>,
    /// Theta per instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thetas: Option<Vec<f64>>,
    /// P&L dispersion per instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma_pnls: Option<Vec<f64>>,
    /// Previous-quarter roll per instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_quarterlies: Option<Vec<f64>>,
    /// Raw roll per instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_sums: Option<Vec<f64>>,
    /// Tail penalty per instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_penalties: Option<Vec<f64>>,

    /// Intra-life option values, `instruments x N_INTRA_DATES`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intra_life_prices: Option<Vec<Vec<f64>>>,
    /// Intra-life expected P&L, `instruments x N_INTRA_DATES`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intra_life_pnl: Option<Vec<Vec<f64>>>,

    /// P&L matrix, `instruments x grid points`.
    pub pnl_matrix: Vec<Vec<f64>>,
    /// Underlying price grid (ascending).
    pub prices: Vec<f64>,
    /// Probability mixture density aligned with `prices`.
    pub mixture: Vec<f64>,
    /// Split point between the left and right regions of the grid.
    pub average_mix: f64,
}

/// One instrument's worth of inputs, used with [`UniverseInput::with_instrument`].
#[derive(Debug, Clone, Default)]
pub struct InstrumentRow {
    /// Premium.
    pub premium: f64,
    /// Delta.
    pub delta: f64,
    /// Implied volatility.
    pub iv: f64,
    /// Average expected P&L.
    pub average_pnl: f64,
    /// Strike.
    pub strike: f64,
    /// Call flag.
    pub is_call: bool,
    /// Normalized roll.
    pub roll: f64,
    /// Gamma.
    pub gamma: f64,
    /// Vega.
    pub vega: f64,
    /// Theta.
    pub theta: f64,
    /// P&L dispersion.
    pub sigma_pnl: f64,
    /// Previous-quarter roll.
    pub roll_quarterly: f64,
    /// Raw roll.
    pub roll_sum: f64,
    /// Tail penalty.
    pub tail_penalty: f64,
    /// Intra-life values; `None` falls back to the premium at every checkpoint.
    pub intra_life_prices: Option<[f64; N_INTRA_DATES]>,
    /// Intra-life P&L; `None` falls back to zero.
    pub intra_life_pnl: Option<[f64; N_INTRA_DATES]>,
    /// P&L row over the grid.
    pub pnl: Vec<f64>,
}

impl UniverseInput {
    /// Start an empty universe over a price grid.
    #[must_use]
    pub fn over_grid(prices: Vec<f64>, mixture: Vec<f64>, average_mix: f64) -> Self {
        Self {
            prices,
            mixture,
            average_mix,
            gammas: Some(Vec::new()),
            vegas: Some(Vec::new()),
            thetas: Some(Vec::new()),
            sigma_pnls: Some(Vec::new()),
            roll_quarterlies: Some(Vec::new()),
            roll_sums: Some(Vec::new()),
            tail_penalties: Some(Vec::new()),
            intra_life_prices: Some(Vec::new()),
            intra_life_pnl: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Append one instrument to every column.
    #[must_use]
    pub fn with_instrument(mut self, row: InstrumentRow) -> Self {
        fn push<T>(column: &mut Option<Vec<T>>, value: T) {
            column.get_or_insert_with(Vec::new).push(value);
        }

        self.premiums.push(row.premium);
        self.deltas.push(row.delta);
        self.ivs.push(row.iv);
        self.average_pnls.push(row.average_pnl);
        self.strikes.push(row.strike);
        self.is_calls.push(row.is_call);
        self.rolls.push(row.roll);
        push(&mut self.gammas, row.gamma);
        push(&mut self.vegas, row.vega);
        push(&mut self.thetas, row.theta);
        push(&mut self.sigma_pnls, row.sigma_pnl);
        push(&mut self.roll_quarterlies, row.roll_quarterly);
        push(&mut self.roll_sums, row.roll_sum);
        push(&mut self.tail_penalties, row.tail_penalty);
        push(
            &mut self.intra_life_prices,
            row.intra_life_prices
                .unwrap_or([row.premium; N_INTRA_DATES])
                .to_vec(),
        );
        push(
            &mut self.intra_life_pnl,
            row.intra_life_pnl.unwrap_or([0.0; N_INTRA_DATES]).to_vec(),
        );
        self.pnl_matrix.push(row.pnl);
        self
    }

    /// Number of instruments, taken from the premium column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.premiums.len()
    }

    /// Whether no instruments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.premiums.is_empty()
    }

    /// Check every dimension against the premium column and the grid.
    pub fn validate(&self) -> Result<(), UniverseError> {
        let n = self.len();
        if n == 0 {
            return Err(UniverseError::Empty);
        }
        let grid_len = self.prices.len();
        if grid_len == 0 {
            return Err(UniverseError::EmptyGrid);
        }

        check_len("deltas", self.deltas.len(), n)?;
        check_len("ivs", self.ivs.len(), n)?;
        check_len("average_pnls", self.average_pnls.len(), n)?;
        check_len("strikes", self.strikes.len(), n)?;
        check_len("is_calls", self.is_calls.len(), n)?;
        check_len("rolls", self.rolls.len(), n)?;

        let optional = [
            ("gammas", &self.gammas),
            ("vegas", &self.vegas),
            ("thetas", &self.thetas),
            ("sigma_pnls", &self.sigma_pnls),
            ("roll_quarterlies", &self.roll_quarterlies),
            ("roll_sums", &self.roll_sums),
            ("tail_penalties", &self.tail_penalties),
        ];
        for (field, column) in optional {
            if let Some(values) = column {
                check_len(field, values.len(), n)?;
            }
        }

        for (field, matrix) in [
            ("intra_life_prices", &self.intra_life_prices),
            ("intra_life_pnl", &self.intra_life_pnl),
        ] {
            if let Some(rows) = matrix {
                check_matrix(field, rows, n, N_INTRA_DATES)?;
            }
        }

        check_matrix("pnl_matrix", &self.pnl_matrix, n, grid_len)?;
        check_len("mixture", self.mixture.len(), grid_len)?;

        if let Some(index) = self.prices.windows(2).position(|w| w[1] < w[0]) {
            return Err(UniverseError::UnsortedGrid { index: index + 1 });
        }

        Ok(())
    }
}

const fn check_len(field: &'static str, actual: usize, expected: usize) -> Result<(), UniverseError> {
    if actual == expected {
        Ok(())
    } else {
        Err(UniverseError::DimensionMismatch {
            field,
            expected,
            actual,
        })
    }
}

fn check_matrix(
    field: &'static str,
    rows: &[Vec<f64>],
    n_rows: usize,
    width: usize,
) -> Result<(), UniverseError> {
    check_len(field, rows.len(), n_rows)?;
    for (row, values) in rows.iter().enumerate() {
        if values.len() != width {
            return Err(UniverseError::RowLength {
                field,
                row,
                expected: width,
                actual: values.len(),
            });
        }
    }
    Ok(())
}
