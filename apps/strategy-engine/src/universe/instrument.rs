//! Per-option scalars held by the universe cache.

use serde::{Deserialize, Serialize};

/// Number of intra-life checkpoints carried by every instrument.
pub const N_INTRA_DATES: usize = 5;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    /// Call option (right to buy).
    Call,
    /// Put option (right to sell).
    Put,
}

impl OptionType {
    /// Build from an is-call flag.
    #[must_use]
    pub const fn from_is_call(is_call: bool) -> Self {
        if is_call { Self::Call } else { Self::Put }
    }

    /// Whether this is a call.
    #[must_use]
    pub const fn is_call(self) -> bool {
        matches!(self, Self::Call)
    }
}

/// One pre-priced option of the universe.
///
/// All values arrive pre-computed from the pricing layer; the engine never
/// modifies an instrument after load. The P&L row lives in the cache's
/// contiguous matrix, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Signed cost to acquire one unit.
    pub premium: f64,
    /// Delta.
    pub delta: f64,
    /// Gamma (0.0 when not supplied).
    pub gamma: f64,
    /// Vega (0.0 when not supplied).
    pub vega: f64,
    /// Theta (0.0 when not supplied).
    pub theta: f64,
    /// Implied volatility.
    pub implied_volatility: f64,
    /// Mixture-weighted expected P&L at expiry.
    pub average_pnl: f64,
    /// Dispersion of the P&L under the mixture (0.0 when not supplied).
    pub sigma_pnl: f64,
    /// Strike price.
    pub strike: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// Normalized average roll.
    pub roll: f64,
    /// Previous-quarter roll (0.0 when not supplied).
    pub roll_quarterly: f64,
    /// Raw, non-normalized roll (0.0 when not supplied).
    pub roll_sum: f64,
    /// Tail-risk penalty (0.0 when not supplied).
    pub tail_penalty: f64,
    /// Option value at each intra-life checkpoint.
    pub intra_life_prices: [f64; N_INTRA_DATES],
    /// Expected P&L at each intra-life checkpoint.
    pub intra_life_pnl: [f64; N_INTRA_DATES],
}

impl Instrument {
    /// Whether this instrument is a call.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        self.option_type.is_call()
    }
}
