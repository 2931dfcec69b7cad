//! Upgrade economy.
//!
//! Upgrades are paid for with the building's own garrison. Each level costs
//! `floor(base_upgrade_cost * upgrade_cost_factor^(level - 1))` units and
//! raises capacity by 20.
//!
//! Neutral buildings upgrade themselves on a separate, flat price curve
//! (see [`neutral_upgrade_price`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::building::{Building, BuildingId};
use crate::config::GameConfig;
use crate::math::{fixed_powi, floor_u32, Fixed};

/// Why an upgrade was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UpgradeRejection {
    /// Already at the highest level.
    #[error("Building is already at maximum level")]
    MaxLevel,
    /// The garrison cannot pay the cost.
    #[error("Not enough units to upgrade: need {required}, have {available}")]
    InsufficientUnits {
        /// Upgrade cost.
        required: u32,
        /// Current garrison.
        available: u32,
    },
}

/// A completed upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeReceipt {
    /// Upgraded building.
    pub id: BuildingId,
    /// Units spent.
    pub cost: u32,
    /// Level after the upgrade.
    pub new_level: u32,
    /// Capacity after the upgrade.
    pub new_max_units: u32,
}

/// Cost of upgrading from `level` to `level + 1`.
#[must_use]
pub fn upgrade_cost(level: u32, config: &GameConfig) -> u32 {
    let factor = fixed_powi(config.cost_factor(), level.saturating_sub(1));
    floor_u32(Fixed::from_num(config.base_upgrade_cost).saturating_mul(factor))
}

/// Upgrade `building` in place if it can pay for it.
///
/// Ownership checks are the caller's concern.
pub fn try_upgrade(
    building: &mut Building,
    config: &GameConfig,
) -> Result<UpgradeReceipt, UpgradeRejection> {
    if building.level >= config.max_building_level {
        return Err(UpgradeRejection::MaxLevel);
    }

    let cost = upgrade_cost(building.level, config);
    if building.units < cost {
        return Err(UpgradeRejection::InsufficientUnits {
            required: cost,
            available: building.units,
        });
    }

    building.units -= cost;
    advance_level(building, config);

    Ok(UpgradeReceipt {
        id: building.id.clone(),
        cost,
        new_level: building.level,
        new_max_units: building.max_units,
    })
}

/// Price a neutral building pays to upgrade itself from `level`.
#[must_use]
pub const fn neutral_upgrade_price(level: u32) -> u32 {
    20 + level * 5
}

/// Whether a neutral building is rich enough to upgrade itself.
#[must_use]
pub fn can_self_upgrade(building: &Building, config: &GameConfig) -> bool {
    building.level < config.max_building_level
        && building.units > neutral_upgrade_price(building.level)
}

/// Apply a neutral self-upgrade. Callers check [`can_self_upgrade`] first.
pub fn apply_self_upgrade(building: &mut Building, config: &GameConfig) -> UpgradeReceipt {
    let cost = neutral_upgrade_price(building.level).min(building.units);
    building.units -= cost;
    advance_level(building, config);

    UpgradeReceipt {
        id: building.id.clone(),
        cost,
        new_level: building.level,
        new_max_units: building.max_units,
    }
}

fn advance_level(building: &mut Building, config: &GameConfig) {
    building.max_units = config.max_units_per_building + building.level * 20;
    building.level += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::Owner;
    use crate::math::Vec2Fixed;
    use proptest::prelude::*;

    fn building(units: u32, level: u32) -> Building {
        Building {
            id: BuildingId::from("b1"),
            owner: Owner::Player,
            units,
            max_units: Building::capacity_for_level(100, level),
            level,
            position: Vec2Fixed::ZERO,
            element: None,
            variation: None,
            is_invulnerable: false,
        }
    }

    #[test]
    fn test_upgrade_cost_curve() {
        let config = GameConfig::default();
        assert_eq!(upgrade_cost(1, &config), 20);
        assert_eq!(upgrade_cost(2, &config), 30);
        assert_eq!(upgrade_cost(3, &config), 45);
        assert_eq!(upgrade_cost(4, &config), 67);
    }

    #[test]
    fn test_level_one_upgrade() {
        let config = GameConfig::default();
        let mut b = building(25, 1);
        let receipt = try_upgrade(&mut b, &config).unwrap();
        assert_eq!(receipt.cost, 20);
        assert_eq!(b.units, 5);
        assert_eq!(b.level, 2);
        assert_eq!(b.max_units, 120);
    }

    #[test]
    fn test_upgrade_at_exact_cost() {
        let config = GameConfig::default();
        let mut b = building(30, 2);
        assert!(try_upgrade(&mut b, &config).is_ok());
        assert_eq!(b.units, 0);
        assert_eq!(b.max_units, 140);
    }

    #[test]
    fn test_insufficient_units() {
        let config = GameConfig::default();
        let mut b = building(19, 1);
        let before = b.clone();
        assert_eq!(
            try_upgrade(&mut b, &config),
            Err(UpgradeRejection::InsufficientUnits {
                required: 20,
                available: 19
            })
        );
        assert_eq!(b, before);
    }

    #[test]
    fn test_max_level() {
        let config = GameConfig::default();
        let mut b = building(180, 5);
        assert_eq!(try_upgrade(&mut b, &config), Err(UpgradeRejection::MaxLevel));
        assert_eq!(b.units, 180);
    }

    #[test]
    fn test_neutral_self_upgrade() {
        let config = GameConfig::default();
        let mut b = building(26, 1);
        b.owner = Owner::Neutral;
        assert!(can_self_upgrade(&b, &config));
        let receipt = apply_self_upgrade(&mut b, &config);
        assert_eq!(receipt.cost, 25);
        assert_eq!(b.units, 1);
        assert_eq!(b.level, 2);
        assert_eq!(b.max_units, 120);

        let poor = building(25, 1);
        assert!(!can_self_upgrade(&poor, &config));
    }

    proptest! {
        /// A successful upgrade moves level and capacity together and
        /// never leaves the garrison above capacity.
        #[test]
        fn prop_upgrade_preserves_invariants(units in 0u32..=180, level in 1u32..=5) {
            let config = GameConfig::default();
            let mut b = building(units.min(Building::capacity_for_level(100, level)), level);
            let before = b.clone();
            match try_upgrade(&mut b, &config) {
                Ok(receipt) => {
                    prop_assert_eq!(b.level, before.level + 1);
                    prop_assert_eq!(b.max_units, before.max_units + 20);
                    prop_assert_eq!(b.units, before.units - receipt.cost);
                }
                Err(_) => prop_assert_eq!(&b, &before),
            }
            prop_assert!(b.is_consistent());
        }

        /// Cost grows with level.
        #[test]
        fn prop_cost_is_monotonic(level in 1u32..10) {
            let config = GameConfig::default();
            prop_assert!(upgrade_cost(level + 1, &config) >= upgrade_cost(level, &config));
        }
    }
}
