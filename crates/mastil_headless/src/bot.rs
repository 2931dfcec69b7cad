//! Scripted stand-ins for the human player.

use mastil_core::building::{Building, BuildingId, Owner};
use mastil_core::simulation::Simulation;
use serde::{Deserialize, Serialize};

/// Garrison fill above which the expander upgrades, in percent.
const UPGRADE_FILL_PERCENT: u32 = 80;

/// Which bot plays the player side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BotKind {
    /// Never acts.
    #[default]
    Passive,
    /// Upgrades full buildings and attacks the weakest target it can beat
    /// twice over.
    Expander,
}

/// A player bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bot {
    kind: BotKind,
}

impl Bot {
    /// Create a bot.
    #[must_use]
    pub const fn new(kind: BotKind) -> Self {
        Self { kind }
    }

    /// The bot's kind.
    #[must_use]
    pub const fn kind(&self) -> BotKind {
        self.kind
    }

    /// Take one turn at the simulation's current time.
    pub fn act(&self, sim: &mut Simulation) {
        match self.kind {
            BotKind::Passive => {}
            BotKind::Expander => expand(sim),
        }
    }
}

fn expand(sim: &mut Simulation) {
    let full: Vec<_> = sim
        .game()
        .buildings()
        .iter()
        .filter(|b| b.owner == Owner::Player && b.is_above_fill(UPGRADE_FILL_PERCENT))
        .map(|b| b.id.clone())
        .collect();
    for id in full {
        if let Ok(receipt) = sim.upgrade_building(&id) {
            tracing::debug!(building = %id, level = receipt.new_level, "bot upgraded");
        }
    }

    let Some((source, target)) = attack_plan(sim.game().buildings()) else {
        return;
    };
    match sim.send_units(&source, &target) {
        Ok(_) => tracing::debug!(%source, %target, "bot attacked"),
        Err(err) => tracing::debug!(%source, %target, %err, "bot attack refused"),
    }
}

/// Strongest player building against the weakest non-player building, if
/// the source holds more than twice the target's garrison.
#[must_use]
pub fn attack_plan(buildings: &[Building]) -> Option<(BuildingId, BuildingId)> {
    let source = buildings
        .iter()
        .filter(|b| b.owner == Owner::Player)
        .max_by(|a, b| a.units.cmp(&b.units).then_with(|| b.id.cmp(&a.id)))?;
    let target = buildings
        .iter()
        .filter(|b| b.owner != Owner::Player && !b.is_invulnerable)
        .min_by(|a, b| a.units.cmp(&b.units).then_with(|| a.id.cmp(&b.id)))?;

    (source.units > target.units.saturating_mul(2))
        .then(|| (source.id.clone(), target.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastil_test_utils::fixtures::{building, started_simulation};

    #[test]
    fn test_attack_plan_needs_double_strength() {
        let buildings = vec![
            building("p", Owner::Player, 20, 1),
            building("n", Owner::Neutral, 10, 1),
        ];
        assert_eq!(attack_plan(&buildings), None);

        let buildings = vec![
            building("p", Owner::Player, 21, 1),
            building("n", Owner::Neutral, 10, 1),
        ];
        assert_eq!(
            attack_plan(&buildings),
            Some((BuildingId::from("p"), BuildingId::from("n")))
        );
    }

    #[test]
    fn test_attack_plan_skips_shielded_targets() {
        let mut base = building("e", Owner::Enemy, 1, 1);
        base.is_invulnerable = true;
        let buildings = vec![
            building("p", Owner::Player, 50, 1),
            base,
            building("n", Owner::Neutral, 20, 1),
        ];
        assert_eq!(
            attack_plan(&buildings),
            Some((BuildingId::from("p"), BuildingId::from("n")))
        );
    }

    #[test]
    fn test_passive_bot_changes_nothing() {
        let mut sim = started_simulation(1);
        let before = sim.state_hash();
        Bot::new(BotKind::Passive).act(&mut sim);
        assert_eq!(sim.state_hash(), before);
    }

    #[test]
    fn test_expander_attacks_small_outpost() {
        let mut sim = started_simulation(1);
        sim.advance(2_000);
        Bot::new(BotKind::Expander).act(&mut sim);

        assert_eq!(sim.game().transit().len(), 1);
    }
}
