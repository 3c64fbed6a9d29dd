//! Risk and exposure constraints applied to every candidate.

use serde::{Deserialize, Serialize};

/// Stand-in for "no limit" that still round-trips through JSON and YAML.
pub const UNBOUNDED: f64 = 1.0e12;

/// Constraint set for one search.
///
/// Defaults are fully permissive: every grid point falls in the left region
/// (`limit_left = UNBOUNDED`) whose loss limit is itself unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConstraints {
    /// Loss limit for grid points left of `limit_left`.
    pub max_loss_left: f64,
    /// Loss limit for grid points right of `limit_right`.
    pub max_loss_right: f64,
    /// Bound on |net premium|.
    pub max_premium: f64,
    /// Cap on net open puts (short puts minus long puts).
    pub ouvert_gauche: i32,
    /// Cap on net open calls (short calls minus long calls).
    pub ouvert_droite: i32,
    /// Minimum premium an instrument must carry to be sold.
    pub min_premium_sell: f64,
    /// Lower bound of the net delta band.
    pub delta_min: f64,
    /// Upper bound of the net delta band.
    pub delta_max: f64,
    /// Prices strictly below this belong to the left loss region.
    pub limit_left: f64,
    /// Prices strictly above this belong to the right loss region.
    pub limit_right: f64,
    /// Global worst loss must not exceed |net premium|.
    pub premium_only: bool,
    /// Left region loss limited to |net premium| instead of `max_loss_left`.
    pub premium_only_left: bool,
    /// Right region loss limited to |net premium| instead of `max_loss_right`.
    pub premium_only_right: bool,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            max_loss_left: UNBOUNDED,
            max_loss_right: UNBOUNDED,
            max_premium: UNBOUNDED,
            ouvert_gauche: i32::MAX,
            ouvert_droite: i32::MAX,
            min_premium_sell: 0.0,
            delta_min: -UNBOUNDED,
            delta_max: UNBOUNDED,
            limit_left: UNBOUNDED,
            limit_right: UNBOUNDED,
            premium_only: false,
            premium_only_left: false,
            premium_only_right: false,
        }
    }
}

impl SearchConstraints {
    /// Constraints that accept every candidate.
    #[must_use]
    pub fn permissive() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_permissive() {
        let c = SearchConstraints::default();
        assert!(c.max_premium >= UNBOUNDED);
        assert!(c.delta_min < -1.0e9 && c.delta_max > 1.0e9);
        assert!(!c.premium_only);
        assert_eq!(c.ouvert_gauche, i32::MAX);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: SearchConstraints =
            serde_json::from_str(r#"{"max_premium": 3.0, "premium_only": true}"#).unwrap();
        assert!((c.max_premium - 3.0).abs() < f64::EPSILON);
        assert!(c.premium_only);
        assert_eq!(c.min_premium_sell, 0.0);
    }
}
