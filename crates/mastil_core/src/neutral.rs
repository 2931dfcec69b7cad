//! Neutral autonomy.
//!
//! Neutral buildings are not passive: they upgrade themselves when rich,
//! ship surplus units to struggling neutral neighbours and occasionally
//! chat. The planners here only read the building list and decide; the
//! orchestrator applies the decisions.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::building::{Building, BuildingId, Owner};
use crate::config::GameConfig;
use crate::economy::can_self_upgrade;

/// Chance that an eligible neutral actually upgrades on a check.
pub const SELF_UPGRADE_CHANCE_PERCENT: u32 = 30;

/// Chance of an idle chatter line on a check.
pub const CHATTER_CHANCE_PERCENT: u32 = 20;

/// Fill level separating needy neutrals from donors.
pub const AID_FILL_PERCENT: u32 = 80;

/// Units a donor always keeps for itself.
pub const AID_RESERVE: u32 = 5;

/// Cooldown stamps for neutral behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeutralState {
    /// Last neutral self-upgrade.
    pub last_upgrade_ms: u64,
    /// Last mutual-aid transfer.
    pub last_aid_ms: u64,
    /// Last chatter line.
    pub last_chatter_ms: u64,
}

impl NeutralState {
    /// Fresh state; every cooldown starts at `now_ms`.
    #[must_use]
    pub const fn new(now_ms: u64) -> Self {
        Self {
            last_upgrade_ms: now_ms,
            last_aid_ms: now_ms,
            last_chatter_ms: now_ms,
        }
    }
}

/// A planned mutual-aid transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidPlan {
    /// Donor building.
    pub source: BuildingId,
    /// Neediest neutral building.
    pub target: BuildingId,
    /// Units to ship.
    pub units: u32,
}

fn roll<R: Rng + ?Sized>(rng: &mut R, percent: u32) -> bool {
    rng.random_range(0..100) < percent
}

fn cooled_down(last_ms: u64, now_ms: u64, cooldown_ms: u64) -> bool {
    now_ms.saturating_sub(last_ms) >= cooldown_ms
}

/// Pick a neutral building to upgrade itself, if any.
///
/// Stamps the cooldown when a building is picked.
pub fn plan_self_upgrade<R: Rng + ?Sized>(
    state: &mut NeutralState,
    buildings: &[Building],
    config: &GameConfig,
    now_ms: u64,
    rng: &mut R,
) -> Option<BuildingId> {
    if !cooled_down(state.last_upgrade_ms, now_ms, config.neutral_upgrade_cooldown_ms) {
        return None;
    }

    let candidates: Vec<&Building> = buildings
        .iter()
        .filter(|b| b.owner == Owner::Neutral && can_self_upgrade(b, config))
        .collect();
    let chosen = candidates.choose(rng)?;

    if !roll(rng, SELF_UPGRADE_CHANCE_PERCENT) {
        return None;
    }

    state.last_upgrade_ms = now_ms;
    Some(chosen.id.clone())
}

/// Plan a transfer from a well-stocked neutral to the neediest one.
///
/// Stamps the cooldown when a plan is returned.
pub fn plan_mutual_aid<R: Rng + ?Sized>(
    state: &mut NeutralState,
    buildings: &[Building],
    config: &GameConfig,
    now_ms: u64,
    rng: &mut R,
) -> Option<AidPlan> {
    if !cooled_down(state.last_aid_ms, now_ms, config.neutral_aid_cooldown_ms) {
        return None;
    }

    let neutrals: Vec<&Building> = buildings
        .iter()
        .filter(|b| b.owner == Owner::Neutral)
        .collect();
    if neutrals.len() < 2 {
        return None;
    }

    let target = neutrals
        .iter()
        .filter(|b| b.is_below_fill(AID_FILL_PERCENT))
        .min_by(|a, b| a.cmp_fill(b).then_with(|| a.id.cmp(&b.id)))?;

    let donors: Vec<&&Building> = neutrals
        .iter()
        .filter(|b| {
            b.id != target.id && b.units > AID_RESERVE && b.is_above_fill(AID_FILL_PERCENT)
        })
        .collect();
    let source = donors.choose(rng)?;

    let units = (source.units - AID_RESERVE) * 3 / 4;
    if units == 0 {
        return None;
    }

    state.last_aid_ms = now_ms;
    Some(AidPlan {
        source: source.id.clone(),
        target: target.id.clone(),
        units,
    })
}

/// Whether a neutral chatter line should be attempted now.
///
/// The caller stamps `last_chatter_ms` once the line is actually shown.
pub fn should_chatter<R: Rng + ?Sized>(
    state: &NeutralState,
    buildings: &[Building],
    config: &GameConfig,
    now_ms: u64,
    rng: &mut R,
) -> bool {
    if !buildings.iter().any(|b| b.owner == Owner::Neutral) {
        return false;
    }
    if !cooled_down(state.last_chatter_ms, now_ms, config.neutral_chatter_cooldown_ms) {
        return false;
    }
    roll(rng, CHATTER_CHANCE_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2Fixed;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn neutral(id: &str, units: u32) -> Building {
        Building {
            id: BuildingId::from(id),
            owner: Owner::Neutral,
            units,
            max_units: 100,
            level: 1,
            position: Vec2Fixed::ZERO,
            element: None,
            variation: Some(1),
            is_invulnerable: false,
        }
    }

    #[test]
    fn test_mutual_aid_scenario() {
        let config = GameConfig::default();
        let buildings = vec![neutral("n1", 90), neutral("n2", 10)];
        let mut state = NeutralState::new(0);
        let mut rng = SmallRng::seed_from_u64(1);

        let plan = plan_mutual_aid(&mut state, &buildings, &config, 10_000, &mut rng).unwrap();
        assert_eq!(plan.source, BuildingId::from("n1"));
        assert_eq!(plan.target, BuildingId::from("n2"));
        assert_eq!(plan.units, 63);
        assert_eq!(state.last_aid_ms, 10_000);

        // cooldown
        assert!(plan_mutual_aid(&mut state, &buildings, &config, 18_000, &mut rng).is_none());
    }

    #[test]
    fn test_mutual_aid_targets_neediest_with_id_tiebreak() {
        let config = GameConfig::default();
        let buildings = vec![
            neutral("n3", 20),
            neutral("n2", 20),
            neutral("n1", 50),
            neutral("d", 95),
        ];
        let mut state = NeutralState::new(0);
        let mut rng = SmallRng::seed_from_u64(3);
        let plan = plan_mutual_aid(&mut state, &buildings, &config, 10_000, &mut rng).unwrap();
        assert_eq!(plan.target, BuildingId::from("n2"));
        assert_eq!(plan.source, BuildingId::from("d"));
    }

    #[test]
    fn test_mutual_aid_needs_two_neutrals_and_a_donor() {
        let config = GameConfig::default();
        let mut state = NeutralState::new(0);
        let mut rng = SmallRng::seed_from_u64(2);

        let single = vec![neutral("n1", 10)];
        assert!(plan_mutual_aid(&mut state, &single, &config, 20_000, &mut rng).is_none());

        let no_donor = vec![neutral("n1", 10), neutral("n2", 80)];
        assert!(plan_mutual_aid(&mut state, &no_donor, &config, 20_000, &mut rng).is_none());
        assert_eq!(state.last_aid_ms, 0);
    }

    #[test]
    fn test_self_upgrade_requires_rich_candidate() {
        let config = GameConfig::default();
        let buildings = vec![neutral("n1", 25)];
        let mut state = NeutralState::new(0);
        let mut rng = SmallRng::seed_from_u64(5);
        for now in (12_000..600_000).step_by(12_000) {
            assert!(plan_self_upgrade(&mut state, &buildings, &config, now, &mut rng).is_none());
        }
    }

    #[test]
    fn test_self_upgrade_eventually_fires_and_stamps() {
        let config = GameConfig::default();
        let buildings = vec![neutral("n1", 60)];
        let mut state = NeutralState::new(0);
        let mut rng = SmallRng::seed_from_u64(9);

        let mut picked = None;
        for now in (12_000..1_200_000).step_by(12_000) {
            if let Some(id) = plan_self_upgrade(&mut state, &buildings, &config, now, &mut rng) {
                picked = Some((id, now));
                break;
            }
        }
        let (id, now) = picked.expect("30% roll never succeeded in 100 checks");
        assert_eq!(id, BuildingId::from("n1"));
        assert_eq!(state.last_upgrade_ms, now);
        assert!(plan_self_upgrade(&mut state, &buildings, &config, now + 6_000, &mut rng).is_none());
    }

    #[test]
    fn test_chatter_respects_cooldown() {
        let config = GameConfig::default();
        let buildings = vec![neutral("n1", 10)];
        let mut state = NeutralState::new(0);
        let mut rng = SmallRng::seed_from_u64(4);

        assert!(!should_chatter(&state, &buildings, &config, 5_000, &mut rng));

        let mut fired_at = None;
        for now in (30_000..3_000_000).step_by(5_000) {
            if should_chatter(&state, &buildings, &config, now, &mut rng) {
                fired_at = Some(now);
                break;
            }
        }
        let fired_at = fired_at.expect("20% roll never succeeded");
        state.last_chatter_ms = fired_at;
        assert!(!should_chatter(&state, &buildings, &config, fired_at + 25_000, &mut rng));
    }

    #[test]
    fn test_no_chatter_without_neutrals() {
        let config = GameConfig::default();
        let mut b = neutral("b1", 10);
        b.owner = Owner::Player;
        let state = NeutralState::new(0);
        let mut rng = SmallRng::seed_from_u64(4);
        for now in (30_000..300_000).step_by(5_000) {
            assert!(!should_chatter(&state, &[b.clone()], &config, now, &mut rng));
        }
    }
}
