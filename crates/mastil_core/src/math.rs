//! Fixed-point math for the simulation.
//!
//! Map positions, transit distances, AI difficulty and the upgrade cost
//! curve are all computed in fixed-point so that two runs from the same
//! seed produce bit-identical state on any CPU.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// 32 integer bits, 32 fractional bits.
pub type Fixed = I32F32;

/// A position on the normalized map, both axes in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// Horizontal coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Vertical coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Values travel as their raw bit representation (i64) so snapshots
/// round-trip exactly.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bits.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bits.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Origin.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Build a position from layout coordinates.
    ///
    /// Layout files carry plain decimals; they are converted once here and
    /// never touched as floats again. Coordinates must already be checked
    /// against the unit square.
    #[must_use]
    pub fn from_layout(x: f64, y: f64) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Squared euclidean distance.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }
}

/// Square root by binary search; deterministic on every platform.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..48 {
        let mid = (low + high) / Fixed::from_num(2);
        if mid.saturating_mul(mid) <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Integer power of a fixed-point base, saturating on overflow.
#[must_use]
pub fn fixed_powi(base: Fixed, exp: u32) -> Fixed {
    let mut acc = Fixed::ONE;
    for _ in 0..exp {
        acc = acc.saturating_mul(base);
    }
    acc
}

/// Floor a fixed-point value into a `u32`, clamping negatives to zero.
#[must_use]
pub fn floor_u32(value: Fixed) -> u32 {
    if value <= Fixed::ZERO {
        return 0;
    }
    value.floor().checked_to_num::<u32>().unwrap_or(u32::MAX)
}

/// Convert a probability in `[0, 1]` to a whole percentage for integer rolls.
#[must_use]
pub fn probability_percent(probability: Fixed) -> u32 {
    floor_u32(probability.saturating_mul(Fixed::from_num(100)).saturating_round()).min(100)
}
