//! Match metrics collection.
//!
//! [`MetricsCollector`] folds the event stream of one match into a
//! [`MatchReport`].

use mastil_core::ai::Strategy;
use mastil_core::building::Owner;
use mastil_core::events::{GameEvent, GameOutcome};
use mastil_core::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};

use crate::bot::BotKind;

/// Buildings taken, per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureCounts {
    /// Buildings the player conquered.
    pub player: u32,
    /// Buildings the AI conquered.
    pub enemy: u32,
    /// Buildings knocked back to neutral.
    pub neutralized: u32,
}

/// An AI strategy switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyChange {
    /// Virtual time of the switch.
    pub at_ms: u64,
    /// Strategy before.
    pub from: Strategy,
    /// Strategy after.
    pub to: Strategy,
}

/// Outcome and statistics of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Seed the match ran with.
    pub seed: u64,
    /// Bot on the player side.
    pub bot: BotKind,
    /// Winner, if the match finished.
    pub outcome: Option<GameOutcome>,
    /// Virtual duration.
    pub duration_ms: u64,
    /// Conquests per side.
    pub captures: CaptureCounts,
    /// Upgrades bought by the player.
    pub player_upgrades: u32,
    /// Upgrades bought by the AI.
    pub enemy_upgrades: u32,
    /// Transfers dispatched by any side.
    pub transfers: u32,
    /// Player buildings at the end.
    pub final_player_buildings: usize,
    /// AI buildings at the end.
    pub final_enemy_buildings: usize,
    /// Strategy the AI opened with.
    pub opening_strategy: Option<Strategy>,
    /// Every strategy switch, in order.
    pub strategy_history: Vec<StrategyChange>,
    /// Final state hash, for determinism checks.
    pub state_hash: u64,
    /// Final snapshot, when requested.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub final_snapshot: Option<GameSnapshot>,
}

/// Accumulates match events.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    captures: CaptureCounts,
    player_upgrades: u32,
    enemy_upgrades: u32,
    transfers: u32,
    strategy_history: Vec<StrategyChange>,
}

impl MetricsCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record events drained at virtual time `now_ms`.
    pub fn record(&mut self, now_ms: u64, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            match event {
                GameEvent::OwnerChanged { to, .. } => match to {
                    Owner::Player => self.captures.player += 1,
                    Owner::Enemy => self.captures.enemy += 1,
                    Owner::Neutral => self.captures.neutralized += 1,
                },
                GameEvent::Upgraded { owner, .. } => match owner {
                    Owner::Player => self.player_upgrades += 1,
                    Owner::Enemy => self.enemy_upgrades += 1,
                    Owner::Neutral => {}
                },
                GameEvent::TransferDispatched { .. } => self.transfers += 1,
                GameEvent::StrategyChanged { from, to } => {
                    self.strategy_history.push(StrategyChange {
                        at_ms: now_ms,
                        from,
                        to,
                    });
                }
                GameEvent::Sound(_)
                | GameEvent::TransferResolved { .. }
                | GameEvent::GraceExpired { .. }
                | GameEvent::GameOver(_) => {}
            }
        }
    }

    /// Captures so far.
    #[must_use]
    pub const fn captures(&self) -> CaptureCounts {
        self.captures
    }

    /// Build the report from the final snapshot.
    #[must_use]
    pub fn finish(
        self,
        seed: u64,
        bot: BotKind,
        snapshot: GameSnapshot,
        state_hash: u64,
        keep_snapshot: bool,
    ) -> MatchReport {
        let opening_strategy = self
            .strategy_history
            .first()
            .map(|change| change.from)
            .or(snapshot.ai_strategy);

        MatchReport {
            seed,
            bot,
            outcome: snapshot.phase.outcome(),
            duration_ms: snapshot.elapsed_ms,
            captures: self.captures,
            player_upgrades: self.player_upgrades,
            enemy_upgrades: self.enemy_upgrades,
            transfers: self.transfers,
            final_player_buildings: snapshot.player_building_count,
            final_enemy_buildings: snapshot.enemy_building_count,
            opening_strategy,
            strategy_history: self.strategy_history,
            state_hash,
            final_snapshot: keep_snapshot.then_some(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastil_core::building::BuildingId;
    use mastil_core::events::SoundCue;

    #[test]
    fn test_captures_by_new_owner() {
        let mut collector = MetricsCollector::new();
        let changed = |to| GameEvent::OwnerChanged {
            building: BuildingId::from("n1"),
            from: Owner::Neutral,
            to,
        };
        collector.record(
            1_000,
            [
                changed(Owner::Player),
                changed(Owner::Player),
                changed(Owner::Enemy),
                GameEvent::Sound(SoundCue::Attack),
            ],
        );

        assert_eq!(
            collector.captures(),
            CaptureCounts {
                player: 2,
                enemy: 1,
                neutralized: 0
            }
        );
    }

    #[test]
    fn test_strategy_history_keeps_time() {
        let mut collector = MetricsCollector::new();
        collector.record(
            300_000,
            [GameEvent::StrategyChanged {
                from: Strategy::Swarm,
                to: Strategy::Fortress,
            }],
        );
        assert_eq!(
            collector.strategy_history,
            vec![StrategyChange {
                at_ms: 300_000,
                from: Strategy::Swarm,
                to: Strategy::Fortress
            }]
        );
    }
}
