//! Unit production.
//!
//! Owned buildings grow by their level every production tick; neutral
//! buildings only trickle one unit per slow regeneration tick. Both clamp
//! at capacity.

use crate::building::{Building, Owner};

/// One production tick for player and enemy buildings.
///
/// Returns the total number of units produced.
pub fn produce_units(buildings: &mut [Building]) -> u32 {
    buildings
        .iter_mut()
        .filter(|b| b.owner != Owner::Neutral && b.has_room())
        .map(|b| {
            let level = b.level;
            b.add_units(level)
        })
        .sum()
}

/// One slow regeneration tick for neutral buildings.
///
/// Returns the total number of units regenerated.
pub fn regenerate_neutrals(buildings: &mut [Building]) -> u32 {
    buildings
        .iter_mut()
        .filter(|b| b.owner == Owner::Neutral && b.has_room())
        .map(|b| b.add_units(1))
        .sum()
}
