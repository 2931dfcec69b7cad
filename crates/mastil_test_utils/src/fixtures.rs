//! Test fixtures and helpers.
//!
//! Pre-built buildings, layouts and started games for consistent testing.

use mastil_core::building::{Building, BuildingId, Element, Owner};
use mastil_core::config::{GameConfig, TransitTiming};
use mastil_core::data::{Layout, LayoutEntry};
use mastil_core::game::Game;
use mastil_core::math::Vec2Fixed;
use mastil_core::simulation::Simulation;

/// Name used by every started fixture.
pub const PLAYER_NAME: &str = "Tester";

/// A level-`level` building with the default capacity for that level.
#[must_use]
pub fn building(id: &str, owner: Owner, units: u32, level: u32) -> Building {
    Building {
        id: BuildingId::from(id),
        owner,
        units,
        max_units: Building::capacity_for_level(100, level),
        level,
        position: Vec2Fixed::ZERO,
        element: None,
        variation: None,
        is_invulnerable: false,
    }
}

/// A layout entry at level 1.
#[must_use]
pub fn entry(id: &str, owner: Owner, units: u32, x: f64, y: f64) -> LayoutEntry {
    LayoutEntry {
        id: BuildingId::from(id),
        owner,
        units,
        level: 1,
        x,
        y,
        invulnerable: false,
    }
}

/// Smallest playable map: one base each and two neutrals between them.
/// Nothing is invulnerable.
#[must_use]
pub fn two_base_layout() -> Layout {
    Layout {
        buildings: vec![
            entry("p", Owner::Player, 20, 0.1, 0.5),
            entry("e", Owner::Enemy, 20, 0.9, 0.5),
            entry("n1", Owner::Neutral, 10, 0.5, 0.3),
            entry("n2", Owner::Neutral, 10, 0.5, 0.7),
        ],
    }
}

/// Default config with fixed-duration transit, for tests that need exact
/// arrival times.
#[must_use]
pub fn arrow_config(duration_ms: u64) -> GameConfig {
    GameConfig {
        transit: TransitTiming::Arrow { duration_ms },
        ..GameConfig::default()
    }
}

/// A game on `layout` that has passed player setup at time 0.
///
/// # Panics
///
/// Panics if the config or layout is invalid.
#[must_use]
pub fn started_game(config: GameConfig, layout: Layout, seed: u64) -> Game {
    let mut game = Game::new(config, layout, seed).expect("fixture data is valid");
    game.handle_player_setup(PLAYER_NAME, Element::Water, 0)
        .expect("fresh game accepts setup");
    game
}

/// A simulation on the standard map that has passed player setup.
///
/// # Panics
///
/// Panics if the default data is invalid.
#[must_use]
pub fn started_simulation(seed: u64) -> Simulation {
    started_simulation_with(GameConfig::default(), Layout::standard(), seed)
}

/// A simulation on `layout` that has passed player setup.
///
/// # Panics
///
/// Panics if the config or layout is invalid.
#[must_use]
pub fn started_simulation_with(config: GameConfig, layout: Layout, seed: u64) -> Simulation {
    let mut sim = Simulation::new(config, layout, seed).expect("fixture data is valid");
    sim.setup(PLAYER_NAME, Element::Water)
        .expect("fresh game accepts setup");
    tracing::debug!(seed, "started simulation fixture");
    sim
}

/// Look up a building that must exist.
///
/// # Panics
///
/// Panics if `id` is not on the map.
#[must_use]
pub fn units_of(game: &Game, id: &str) -> u32 {
    game.building(&BuildingId::from(id))
        .map(|b| b.units)
        .unwrap_or_else(|| panic!("no building {id}"))
}

/// Owner of a building that must exist.
///
/// # Panics
///
/// Panics if `id` is not on the map.
#[must_use]
pub fn owner_of(game: &Game, id: &str) -> Owner {
    game.building(&BuildingId::from(id))
        .map(|b| b.owner)
        .unwrap_or_else(|| panic!("no building {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_base_layout_is_valid() {
        assert!(two_base_layout().validate(&GameConfig::default()).is_ok());
    }

    #[test]
    fn test_started_simulation_is_playing() {
        let sim = started_simulation(1);
        assert!(sim.game().is_active());
        assert_eq!(owner_of(sim.game(), "b1"), Owner::Player);
    }

    #[test]
    fn test_building_capacity_follows_level() {
        assert_eq!(building("x", Owner::Neutral, 0, 3).max_units, 140);
    }
}
