//! Legs: (instrument, direction) pairs that make up a candidate.

use serde::{Deserialize, Serialize};

use crate::universe::{OptionType, UniverseCache};

/// Position direction for a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegDirection {
    /// Short position (sold/written), sign -1.
    Short,
    /// Long position (bought), sign +1.
    Long,
}

impl LegDirection {
    /// Both directions, long first.
    pub const BOTH: [Self; 2] = [Self::Long, Self::Short];

    /// Signed multiplier.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    /// Signed integer form (+1 / -1).
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Long => 1,
            Self::Short => -1,
        }
    }

    /// Direction selected by bit `leg` of a sign mask (set = long).
    #[inline]
    #[must_use]
    pub const fn from_mask(mask: u32, leg: usize) -> Self {
        if mask & (1 << leg) != 0 {
            Self::Long
        } else {
            Self::Short
        }
    }
}

/// A leg as seen by the enumerator: an index into the cache plus a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Leg {
    /// Instrument index in the universe cache.
    pub index: u32,
    /// Long or short.
    pub direction: LegDirection,
}

impl Leg {
    /// Create a leg.
    #[must_use]
    pub const fn new(index: u32, direction: LegDirection) -> Self {
        Self { index, direction }
    }

    /// Long leg.
    #[must_use]
    pub const fn long(index: u32) -> Self {
        Self::new(index, LegDirection::Long)
    }

    /// Short leg.
    #[must_use]
    pub const fn short(index: u32) -> Self {
        Self::new(index, LegDirection::Short)
    }
}

/// A leg of an accepted candidate, with the contract fields dedup needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegView {
    /// Instrument index.
    pub index: u32,
    /// Long or short.
    pub direction: LegDirection,
    /// Strike of the instrument.
    pub strike: f64,
    /// Call or put.
    pub option_type: OptionType,
}

impl LegView {
    /// Resolve a leg against the cache.
    #[must_use]
    pub fn resolve(cache: &UniverseCache, leg: Leg) -> Self {
        let inst = cache.instrument(leg.index);
        Self {
            index: leg.index,
            direction: leg.direction,
            strike: inst.strike,
            option_type: inst.option_type,
        }
    }

    /// Back to an index/direction leg.
    #[must_use]
    pub const fn leg(&self) -> Leg {
        Leg::new(self.index, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_signs() {
        assert_eq!(LegDirection::Long.sign(), 1.0);
        assert_eq!(LegDirection::Short.sign(), -1.0);
        assert_eq!(LegDirection::Short.as_i8(), -1);
    }

    #[test]
    fn test_direction_from_mask() {
        // mask 0b101 over three legs: long, short, long
        assert_eq!(LegDirection::from_mask(0b101, 0), LegDirection::Long);
        assert_eq!(LegDirection::from_mask(0b101, 1), LegDirection::Short);
        assert_eq!(LegDirection::from_mask(0b101, 2), LegDirection::Long);
    }
}
