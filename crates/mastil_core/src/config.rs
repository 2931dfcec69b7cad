//! Game tuning parameters.
//!
//! Every field has a default, so a RON file only needs to name what it
//! overrides:
//!
//! ```ron
//! GameConfig(
//!     ai_action_interval_ms: 2000,
//!     transit: Arrow(duration_ms: 1500),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::building::Building;
use crate::error::{GameError, Result};
use crate::math::Fixed;

/// Largest whole value a [`Fixed`] can hold. Every count, extent and
/// duration that enters fixed-point math is bounded by it.
pub const FIXED_INT_MAX: u64 = i32::MAX as u64;

/// How long a transfer takes to reach its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitTiming {
    /// Duration proportional to distance at `unit_speed`.
    #[default]
    Travel,
    /// Every transfer takes the same time.
    Arrow {
        /// Fixed transit duration.
        duration_ms: u64,
    },
}

/// Tuning knobs for one game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Period of the owned-building production clock.
    pub unit_generation_interval_ms: u64,
    /// Capacity of a level 1 building.
    pub max_units_per_building: u32,
    /// Growth factor of the upgrade cost curve.
    pub upgrade_cost_factor: f64,
    /// Cost of the first upgrade.
    pub base_upgrade_cost: u32,
    /// Period of the AI decision clock.
    pub ai_action_interval_ms: u64,
    /// Travel speed in pixels per second.
    pub unit_speed: u32,
    /// Highest reachable level.
    pub max_building_level: u32,

    /// Period of the transit/frame clock.
    pub frame_interval_ms: u64,
    /// Period of the slow neutral regeneration clock.
    pub neutral_regen_interval_ms: u64,
    /// Period of the neutral self-upgrade check.
    pub neutral_upgrade_interval_ms: u64,
    /// Minimum time between two neutral self-upgrades.
    pub neutral_upgrade_cooldown_ms: u64,
    /// Period of the neutral mutual-aid check.
    pub neutral_aid_interval_ms: u64,
    /// Minimum time between two mutual-aid transfers.
    pub neutral_aid_cooldown_ms: u64,
    /// Period of the neutral chatter check.
    pub neutral_chatter_interval_ms: u64,
    /// Minimum time between two chatter lines.
    pub neutral_chatter_cooldown_ms: u64,

    /// How long a posted message stays visible.
    pub message_duration_ms: u64,
    /// Minimum time between two AI remarks.
    pub ai_message_cooldown_ms: u64,
    /// Minimum time between two AI upgrade checks.
    pub ai_upgrade_check_ms: u64,
    /// How long the AI home base stays invulnerable after setup.
    pub enemy_base_grace_ms: u64,
    /// Minimum time between two AI strategy rolls.
    pub strategy_switch_interval_ms: u64,
    /// Chance that a strategy roll switches strategy.
    pub strategy_switch_chance: f64,
    /// AI turns until difficulty reaches 1.
    pub max_turns_to_full_difficulty: u32,

    /// Pixel size of the map's long edge, used to scale distances.
    pub map_extent_px: u32,
    /// Shortest possible travel time.
    pub min_transit_ms: u64,
    /// Transit timing mode.
    pub transit: TransitTiming,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            unit_generation_interval_ms: 1000,
            max_units_per_building: 100,
            upgrade_cost_factor: 1.5,
            base_upgrade_cost: 20,
            ai_action_interval_ms: 3000,
            unit_speed: 100,
            max_building_level: 5,
            frame_interval_ms: 16,
            neutral_regen_interval_ms: 15_000,
            neutral_upgrade_interval_ms: 12_000,
            neutral_upgrade_cooldown_ms: 12_000,
            neutral_aid_interval_ms: 8_000,
            neutral_aid_cooldown_ms: 10_000,
            neutral_chatter_interval_ms: 5_000,
            neutral_chatter_cooldown_ms: 30_000,
            message_duration_ms: 3_000,
            ai_message_cooldown_ms: 5_000,
            ai_upgrade_check_ms: 5_000,
            enemy_base_grace_ms: 60_000,
            strategy_switch_interval_ms: 300_000,
            strategy_switch_chance: 0.5,
            max_turns_to_full_difficulty: 6000,
            map_extent_px: 1000,
            min_transit_ms: 250,
            transit: TransitTiming::Travel,
        }
    }
}

impl GameConfig {
    /// Parse a config from RON text. `origin` names the source in errors.
    pub fn from_ron(source: &str, origin: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: origin.to_owned(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("unit_generation_interval_ms", self.unit_generation_interval_ms),
            ("ai_action_interval_ms", self.ai_action_interval_ms),
            ("frame_interval_ms", self.frame_interval_ms),
            ("neutral_regen_interval_ms", self.neutral_regen_interval_ms),
            ("neutral_upgrade_interval_ms", self.neutral_upgrade_interval_ms),
            ("neutral_aid_interval_ms", self.neutral_aid_interval_ms),
            ("neutral_chatter_interval_ms", self.neutral_chatter_interval_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, value)| *value == 0) {
            return Err(GameError::InvalidConfig(format!("{name} must be non-zero")));
        }
        if !(self.upgrade_cost_factor >= 1.0 && self.upgrade_cost_factor.is_finite()) {
            return Err(GameError::InvalidConfig(
                "upgrade_cost_factor must be a finite value >= 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.strategy_switch_chance) {
            return Err(GameError::InvalidConfig(
                "strategy_switch_chance must be within [0, 1]".into(),
            ));
        }
        if self.max_building_level == 0 {
            return Err(GameError::InvalidConfig(
                "max_building_level must be at least 1".into(),
            ));
        }
        if self.max_units_per_building == 0 {
            return Err(GameError::InvalidConfig(
                "max_units_per_building must be non-zero".into(),
            ));
        }
        if self.unit_speed == 0 {
            return Err(GameError::InvalidConfig("unit_speed must be non-zero".into()));
        }
        if self.max_turns_to_full_difficulty == 0 {
            return Err(GameError::InvalidConfig(
                "max_turns_to_full_difficulty must be non-zero".into(),
            ));
        }
        self.validate_fixed_range()
    }

    fn validate_fixed_range(&self) -> Result<()> {
        if Fixed::checked_from_num(self.upgrade_cost_factor).is_none() {
            return Err(GameError::InvalidConfig(format!(
                "upgrade_cost_factor must not exceed {FIXED_INT_MAX}"
            )));
        }

        let arrow_ms = match self.transit {
            TransitTiming::Arrow { duration_ms } => duration_ms,
            TransitTiming::Travel => 0,
        };
        let bounded = [
            ("base_upgrade_cost", u64::from(self.base_upgrade_cost)),
            ("max_units_per_building", u64::from(self.max_units_per_building)),
            ("unit_speed", u64::from(self.unit_speed)),
            (
                "max_turns_to_full_difficulty",
                u64::from(self.max_turns_to_full_difficulty),
            ),
            ("map_extent_px", u64::from(self.map_extent_px)),
            ("min_transit_ms", self.min_transit_ms),
            ("transit duration_ms", arrow_ms),
        ];
        if let Some((name, _)) = bounded.iter().find(|(_, value)| *value > FIXED_INT_MAX) {
            return Err(GameError::InvalidConfig(format!(
                "{name} must not exceed {FIXED_INT_MAX}"
            )));
        }

        let top_capacity =
            Building::capacity_for_level(self.max_units_per_building, self.max_building_level);
        if u64::from(top_capacity) > FIXED_INT_MAX {
            return Err(GameError::InvalidConfig(format!(
                "capacity at max_building_level must not exceed {FIXED_INT_MAX}"
            )));
        }
        Ok(())
    }

    /// Upgrade cost growth factor in fixed-point.
    #[must_use]
    pub fn cost_factor(&self) -> Fixed {
        Fixed::from_num(self.upgrade_cost_factor)
    }

    /// Strategy switch probability in fixed-point.
    #[must_use]
    pub fn switch_chance(&self) -> Fixed {
        Fixed::from_num(self.strategy_switch_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = GameConfig::from_ron(
            "(ai_action_interval_ms: 2000, transit: Arrow(duration_ms: 1500))",
            "inline",
        )
        .unwrap();
        assert_eq!(config.ai_action_interval_ms, 2000);
        assert_eq!(config.transit, TransitTiming::Arrow { duration_ms: 1500 });
        assert_eq!(config.max_building_level, 5);
        assert_eq!(config.unit_generation_interval_ms, 1000);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = GameConfig {
            frame_interval_ms: 0,
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("frame_interval_ms"));
    }

    #[test]
    fn test_validate_rejects_shrinking_cost_factor() {
        let config = GameConfig {
            upgrade_cost_factor: 0.9,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_capacity_and_level() {
        let config = GameConfig {
            max_units_per_building: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            max_building_level: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_values_beyond_fixed_range() {
        let too_big = 3_000_000_000;
        let cases = [
            GameConfig {
                base_upgrade_cost: too_big,
                ..GameConfig::default()
            },
            GameConfig {
                max_turns_to_full_difficulty: too_big,
                ..GameConfig::default()
            },
            GameConfig {
                map_extent_px: too_big,
                ..GameConfig::default()
            },
            GameConfig {
                unit_speed: too_big,
                ..GameConfig::default()
            },
            GameConfig {
                max_units_per_building: too_big,
                ..GameConfig::default()
            },
            GameConfig {
                upgrade_cost_factor: 1e12,
                ..GameConfig::default()
            },
            GameConfig {
                min_transit_ms: u64::from(too_big),
                ..GameConfig::default()
            },
            GameConfig {
                transit: TransitTiming::Arrow {
                    duration_ms: u64::MAX,
                },
                ..GameConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(GameError::InvalidConfig(_))),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_overflowing_top_capacity() {
        let config = GameConfig {
            max_units_per_building: i32::MAX as u32 - 10,
            max_building_level: 3,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));

        let config = GameConfig {
            max_building_level: u32::MAX,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_largest_accepted_values_stay_usable() {
        let config = GameConfig {
            base_upgrade_cost: i32::MAX as u32,
            upgrade_cost_factor: 1000.0,
            max_turns_to_full_difficulty: i32::MAX as u32,
            map_extent_px: i32::MAX as u32,
            ..GameConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            crate::economy::upgrade_cost(config.max_building_level, &config),
            i32::MAX as u32
        );
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = GameConfig::from_ron("(unit_speed: \"fast\")", "tuning.ron").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { ref path, .. } if path == "tuning.ron"));
    }
}
