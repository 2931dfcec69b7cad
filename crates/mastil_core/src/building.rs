//! The building entity.
//!
//! Buildings are the only mutable entities on the map. Units never exist
//! outside a building except while in transit (see [`crate::transit`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;

/// Stable, unique building identifier (e.g. `"b1"`, `"n4"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(String);

impl BuildingId {
    /// Create an id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BuildingId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side controls a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    /// The human player.
    Player,
    /// The AI opponent.
    Enemy,
    /// Unaligned buildings with their own autonomy.
    Neutral,
}

/// Cosmetic elemental affinity of a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Water.
    Water,
    /// Earth.
    Earth,
    /// Air.
    Air,
    /// Fire.
    Fire,
}

impl Element {
    /// Every element, in selection order.
    pub const ALL: [Self; 4] = [Self::Water, Self::Earth, Self::Air, Self::Fire];
}

/// A building on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    /// Unique id, fixed for the session.
    pub id: BuildingId,
    /// Current owner.
    pub owner: Owner,
    /// Garrison size, always `<= max_units`.
    pub units: u32,
    /// Garrison capacity, grows with level.
    pub max_units: u32,
    /// Upgrade level, starts at 1.
    pub level: u32,
    /// Position on the normalized map; only affects transit time.
    pub position: Vec2Fixed,
    /// Elemental affinity of player and enemy buildings.
    pub element: Option<Element>,
    /// Visual variant of neutral buildings (1..=3).
    pub variation: Option<u8>,
    /// Hostile arrivals are shielded while set.
    pub is_invulnerable: bool,
}

impl Building {
    /// Capacity a building has at `level` given the base capacity,
    /// saturating at `u32::MAX`.
    #[must_use]
    pub const fn capacity_for_level(base_capacity: u32, level: u32) -> u32 {
        base_capacity.saturating_add(level.saturating_sub(1).saturating_mul(20))
    }

    /// Add units, clamping at capacity. Returns how many were actually added.
    pub fn add_units(&mut self, amount: u32) -> u32 {
        let before = self.units;
        self.units = self.units.saturating_add(amount).min(self.max_units);
        self.units - before
    }

    /// Whether the garrison is below capacity.
    #[must_use]
    pub const fn has_room(&self) -> bool {
        self.units < self.max_units
    }

    /// Compare the fill ratio of two buildings without division.
    #[must_use]
    pub fn cmp_fill(&self, other: &Self) -> std::cmp::Ordering {
        let lhs = u64::from(self.units) * u64::from(other.max_units.max(1));
        let rhs = u64::from(other.units) * u64::from(self.max_units.max(1));
        lhs.cmp(&rhs)
    }

    /// Whether the building holds strictly more than `percent`% of capacity.
    #[must_use]
    pub fn is_above_fill(&self, percent: u32) -> bool {
        u64::from(self.units) * 100 > u64::from(self.max_units) * u64::from(percent)
    }

    /// Whether the building holds strictly less than `percent`% of capacity.
    #[must_use]
    pub fn is_below_fill(&self, percent: u32) -> bool {
        u64::from(self.units) * 100 < u64::from(self.max_units) * u64::from(percent)
    }

    /// Check the garrison and level invariants.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.level >= 1 && self.units <= self.max_units
    }
}

/// Visual variant of a neutral building, derived from the digits in its id.
///
/// `(digits % 3) + 1`; ids without digits get 0.
#[must_use]
pub fn neutral_variation(id: &BuildingId) -> u8 {
    let digits: String = id.as_str().chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    let remainder = digits
        .bytes()
        .fold(0u32, |acc, d| (acc * 10 + u32::from(d - b'0')) % 3);
    remainder as u8 + 1
}

/// Find a building by id.
#[must_use]
pub fn find<'a>(buildings: &'a [Building], id: &BuildingId) -> Option<&'a Building> {
    buildings.iter().find(|b| &b.id == id)
}

/// Find a building by id, mutably.
pub fn find_mut<'a>(buildings: &'a mut [Building], id: &BuildingId) -> Option<&'a mut Building> {
    buildings.iter_mut().find(|b| &b.id == id)
}

/// Count buildings held by `owner`.
#[must_use]
pub fn count_owned(buildings: &[Building], owner: Owner) -> usize {
    buildings.iter().filter(|b| b.owner == owner).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building(units: u32, max_units: u32) -> Building {
        Building {
            id: BuildingId::from("t1"),
            owner: Owner::Neutral,
            units,
            max_units,
            level: 1,
            position: Vec2Fixed::ZERO,
            element: None,
            variation: None,
            is_invulnerable: false,
        }
    }

    #[test]
    fn test_capacity_for_level() {
        assert_eq!(Building::capacity_for_level(100, 1), 100);
        assert_eq!(Building::capacity_for_level(100, 2), 120);
        assert_eq!(Building::capacity_for_level(100, 5), 180);
        assert_eq!(Building::capacity_for_level(u32::MAX - 5, 2), u32::MAX);
        assert_eq!(Building::capacity_for_level(100, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_add_units_clamps() {
        let mut b = building(98, 100);
        assert_eq!(b.add_units(5), 2);
        assert_eq!(b.units, 100);
        assert!(!b.has_room());
    }

    #[test]
    fn test_fill_comparisons() {
        let low = building(10, 100);
        let high = building(30, 120);
        assert_eq!(low.cmp_fill(&high), std::cmp::Ordering::Less);
        assert!(building(81, 100).is_above_fill(80));
        assert!(!building(80, 100).is_above_fill(80));
        assert!(building(79, 100).is_below_fill(80));
        assert!(!building(80, 100).is_below_fill(80));
    }

    #[test]
    fn test_neutral_variation() {
        assert_eq!(neutral_variation(&BuildingId::from("n1")), 2);
        assert_eq!(neutral_variation(&BuildingId::from("h3")), 1);
        assert_eq!(neutral_variation(&BuildingId::from("b5")), 3);
        assert_eq!(neutral_variation(&BuildingId::from("x12")), 1);
        assert_eq!(neutral_variation(&BuildingId::from("hub")), 0);
    }

    #[test]
    fn test_find_and_count() {
        let mut buildings = vec![building(1, 10)];
        buildings[0].owner = Owner::Player;
        assert!(find(&buildings, &BuildingId::from("t1")).is_some());
        assert!(find(&buildings, &BuildingId::from("t2")).is_none());
        assert_eq!(count_owned(&buildings, Owner::Player), 1);
        assert_eq!(count_owned(&buildings, Owner::Enemy), 0);
    }
}
