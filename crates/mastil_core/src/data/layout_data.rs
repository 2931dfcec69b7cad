//! Starting map layout.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::building::{neutral_variation, Building, BuildingId, Owner};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::math::Vec2Fixed;

/// One building in the starting layout.
///
/// # Example RON
///
/// ```ron
/// LayoutEntry(
///     id: "b2",
///     owner: Enemy,
///     units: 20,
///     x: 0.9,
///     y: 0.5,
///     invulnerable: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Building id, unique within the layout.
    pub id: BuildingId,
    /// Starting owner.
    pub owner: Owner,
    /// Starting garrison.
    pub units: u32,
    /// Starting level.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Normalized horizontal position.
    pub x: f64,
    /// Normalized vertical position.
    pub y: f64,
    /// Marks the AI home base; shielded during the grace window.
    #[serde(default)]
    pub invulnerable: bool,
}

const fn default_level() -> u32 {
    1
}

/// The full starting map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Buildings in layout order.
    pub buildings: Vec<LayoutEntry>,
}

impl Layout {
    /// The standard sixteen-building map: two bases, four small neutral
    /// outposts, six mid neutrals and four heavily garrisoned hubs.
    #[must_use]
    pub fn standard() -> Self {
        let entry = |id: &str, owner, units, x, y| LayoutEntry {
            id: BuildingId::from(id),
            owner,
            units,
            level: 1,
            x,
            y,
            invulnerable: false,
        };

        let mut enemy_base = entry("b2", Owner::Enemy, 20, 0.90, 0.5);
        enemy_base.invulnerable = true;

        Self {
            buildings: vec![
                entry("b1", Owner::Player, 20, 0.10, 0.5),
                enemy_base,
                entry("b3", Owner::Neutral, 10, 0.20, 0.20),
                entry("b4", Owner::Neutral, 10, 0.80, 0.80),
                entry("b5", Owner::Neutral, 5, 0.20, 0.80),
                entry("b6", Owner::Neutral, 5, 0.80, 0.20),
                entry("n1", Owner::Neutral, 20, 0.10, 0.25),
                entry("n2", Owner::Neutral, 20, 0.10, 0.75),
                entry("n3", Owner::Neutral, 20, 0.90, 0.25),
                entry("n4", Owner::Neutral, 20, 0.90, 0.75),
                entry("n5", Owner::Neutral, 20, 0.25, 0.90),
                entry("n6", Owner::Neutral, 20, 0.75, 0.10),
                entry("h1", Owner::Neutral, 50, 0.25, 0.50),
                entry("h2", Owner::Neutral, 50, 0.75, 0.50),
                entry("h3", Owner::Neutral, 50, 0.50, 0.20),
                entry("h4", Owner::Neutral, 50, 0.50, 0.80),
            ],
        }
    }

    /// Parse a layout from RON text. `origin` names the source in errors.
    ///
    /// Only the shape is checked here; call [`Layout::validate`] against the
    /// config the layout will be played with.
    pub fn from_ron(source: &str, origin: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: origin.to_owned(),
            message: e.to_string(),
        })
    }

    /// Check the layout against building invariants under `config`.
    pub fn validate(&self, config: &GameConfig) -> Result<()> {
        if self.buildings.is_empty() {
            return Err(GameError::EmptyLayout);
        }

        let mut seen = HashSet::new();
        for entry in &self.buildings {
            if !seen.insert(&entry.id) {
                return Err(GameError::DuplicateBuildingId(entry.id.clone()));
            }
            let invalid = |reason: &str| GameError::InvalidBuilding {
                id: entry.id.clone(),
                reason: reason.to_owned(),
            };
            if entry.level == 0 || entry.level > config.max_building_level {
                return Err(invalid("level out of range"));
            }
            if entry.units > Building::capacity_for_level(config.max_units_per_building, entry.level)
            {
                return Err(invalid("units exceed capacity"));
            }
            let unit = 0.0..=1.0;
            if !(unit.contains(&entry.x) && unit.contains(&entry.y)) {
                return Err(invalid("position outside the unit square"));
            }
        }

        for owner in [Owner::Player, Owner::Enemy] {
            if !self.buildings.iter().any(|e| e.owner == owner) {
                return Err(GameError::MissingBase(owner));
            }
        }
        Ok(())
    }

    /// The AI home base: the entry flagged invulnerable, else the first
    /// enemy entry.
    #[must_use]
    pub fn home_base(&self) -> Option<&BuildingId> {
        self.buildings
            .iter()
            .find(|e| e.invulnerable)
            .or_else(|| self.buildings.iter().find(|e| e.owner == Owner::Enemy))
            .map(|e| &e.id)
    }

    /// Instantiate the starting buildings. Elements are assigned later,
    /// at player setup.
    #[must_use]
    pub fn spawn(&self, config: &GameConfig) -> Vec<Building> {
        self.buildings
            .iter()
            .map(|entry| Building {
                id: entry.id.clone(),
                owner: entry.owner,
                units: entry.units,
                max_units: Building::capacity_for_level(config.max_units_per_building, entry.level),
                level: entry.level,
                position: Vec2Fixed::from_layout(entry.x, entry.y),
                element: None,
                variation: (entry.owner == Owner::Neutral).then(|| neutral_variation(&entry.id)),
                is_invulnerable: entry.invulnerable,
            })
            .collect()
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::count_owned;

    #[test]
    fn test_standard_layout_is_valid() {
        let layout = Layout::standard();
        assert_eq!(layout.buildings.len(), 16);
        assert!(layout.validate(&GameConfig::default()).is_ok());
    }

    #[test]
    fn test_standard_spawn() {
        let buildings = Layout::standard().spawn(&GameConfig::default());
        assert_eq!(count_owned(&buildings, Owner::Player), 1);
        assert_eq!(count_owned(&buildings, Owner::Enemy), 1);
        assert_eq!(count_owned(&buildings, Owner::Neutral), 14);
        assert!(buildings.iter().all(|b| b.max_units == 100 && b.level == 1));

        let b2 = &buildings[1];
        assert!(b2.is_invulnerable);
        assert_eq!(b2.variation, None);
        assert_eq!(buildings[6].variation, Some(2));
    }

    #[test]
    fn test_home_base_prefers_flag() {
        let layout = Layout::standard();
        assert_eq!(layout.home_base(), Some(&BuildingId::from("b2")));

        let mut unflagged = Layout::standard();
        unflagged.buildings[1].invulnerable = false;
        assert_eq!(unflagged.home_base(), Some(&BuildingId::from("b2")));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut layout = Layout::standard();
        layout.buildings[3].id = BuildingId::from("b1");
        assert_eq!(
            layout.validate(&GameConfig::default()),
            Err(GameError::DuplicateBuildingId(BuildingId::from("b1")))
        );
    }

    #[test]
    fn test_validate_rejects_missing_enemy() {
        let mut layout = Layout::standard();
        layout.buildings[1].owner = Owner::Neutral;
        assert_eq!(
            layout.validate(&GameConfig::default()),
            Err(GameError::MissingBase(Owner::Enemy))
        );
    }

    #[test]
    fn test_validate_rejects_overfull_and_offmap() {
        let mut layout = Layout::standard();
        layout.buildings[2].units = 101;
        assert!(matches!(
            layout.validate(&GameConfig::default()),
            Err(GameError::InvalidBuilding { .. })
        ));

        let mut layout = Layout::standard();
        layout.buildings[2].x = 1.5;
        assert!(layout.validate(&GameConfig::default()).is_err());
    }

    #[test]
    fn test_validate_rejects_far_and_non_finite_positions() {
        let source = r#"(
            buildings: [
                (id: "p", owner: Player, units: 20, x: 1e12, y: 0.5),
                (id: "e", owner: Enemy, units: 20, x: 0.9, y: 0.5),
            ],
        )"#;
        let layout = Layout::from_ron(source, "inline").unwrap();
        assert!(matches!(
            layout.validate(&GameConfig::default()),
            Err(GameError::InvalidBuilding { ref id, .. }) if id.as_str() == "p"
        ));

        for (x, y) in [(f64::NAN, 0.5), (0.5, f64::INFINITY), (-1e15, 0.5), (0.5, -0.01)] {
            let mut layout = Layout::standard();
            layout.buildings[4].x = x;
            layout.buildings[4].y = y;
            assert!(matches!(
                layout.validate(&GameConfig::default()),
                Err(GameError::InvalidBuilding { .. })
            ));
        }
    }

    #[test]
    fn test_empty_layout() {
        let layout = Layout { buildings: vec![] };
        assert_eq!(layout.validate(&GameConfig::default()), Err(GameError::EmptyLayout));
    }

    #[test]
    fn test_from_ron() {
        let source = r#"(
            buildings: [
                (id: "p", owner: Player, units: 20, x: 0.1, y: 0.5),
                (id: "e", owner: Enemy, units: 20, x: 0.9, y: 0.5, invulnerable: true),
                (id: "m", owner: Neutral, units: 30, level: 2, x: 0.5, y: 0.5),
            ],
        )"#;
        let layout = Layout::from_ron(source, "inline").unwrap();
        assert!(layout.validate(&GameConfig::default()).is_ok());
        let buildings = layout.spawn(&GameConfig::default());
        assert_eq!(buildings[2].max_units, 120);
    }
}
