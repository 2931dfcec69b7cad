//! AI opponent policy.
//!
//! The AI plays one of five strategies. Each strategy is a fixed profile
//! of numbers: how eager it is to attack, how often it invests in
//! upgrades, how it ranks its own buildings as attack sources and how it
//! ranks targets. Every decision tick produces exactly one [`AiAction`].
//!
//! Difficulty ramps from 0 to 1 over `max_turns_to_full_difficulty` turns.
//! Early on the AI only attacks from large garrisons with a wide safety
//! margin; at full difficulty both margins shrink to their floors.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::building::{Building, BuildingId, Owner};
use crate::config::GameConfig;
use crate::math::{floor_u32, probability_percent, Fixed};

/// Garrison an AI building needs before the upgrade branch considers it.
pub const UPGRADE_MIN_UNITS: u32 = 50;

/// How many of the best targets the AI picks from at random.
pub const TARGET_SHORTLIST: usize = 3;

/// AI play style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Many cheap attacks on weak targets.
    Swarm,
    /// Turtles, then hits the player's strongest holdings.
    Fortress,
    /// Invests in levels and goes after high-level buildings.
    Magnate,
    /// Picks off poorly garrisoned buildings.
    Tactician,
    /// Raids with a bias toward the player.
    Marauder,
}

/// How the AI ranks attack targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPreference {
    /// Smallest garrison first.
    Weakest,
    /// Strongest player buildings first.
    Threat,
    /// High level, low garrison.
    Economic,
    /// Lowest fill ratio, player buildings preferred.
    Vulnerable,
    /// Level against garrison, player buildings preferred.
    Balanced,
}

/// Linear source score: `units * units_weight + level * level_weight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceWeights {
    /// Weight of the garrison.
    pub units: i64,
    /// Weight of the level.
    pub level: i64,
}

/// Tuning of one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyProfile {
    /// Scales the safety margin an attack needs, in percent.
    pub attack_threshold_percent: u32,
    /// Chance of taking the upgrade branch on a check, in percent.
    pub upgrade_priority_percent: u32,
    /// Smallest garrison allowed to attack.
    pub min_units_for_attack: u32,
    /// Target ranking.
    pub target_preference: TargetPreference,
    /// Source ranking.
    pub source_weights: SourceWeights,
}

impl Strategy {
    /// Every strategy.
    pub const ALL: [Self; 5] = [
        Self::Swarm,
        Self::Fortress,
        Self::Magnate,
        Self::Tactician,
        Self::Marauder,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Swarm => "Swarm",
            Self::Fortress => "Fortress",
            Self::Magnate => "Magnate",
            Self::Tactician => "Tactician",
            Self::Marauder => "Marauder",
        }
    }

    /// The fixed profile of this strategy.
    #[must_use]
    pub fn profile(self) -> StrategyProfile {
        let (threshold, priority, min_units, target_preference, units, level) = match self {
            Self::Swarm => (60, 10, 15, TargetPreference::Weakest, 1, 0),
            Self::Fortress => (140, 50, 40, TargetPreference::Threat, 1, 5),
            Self::Magnate => (100, 70, 30, TargetPreference::Economic, 1, 10),
            Self::Tactician => (100, 30, 25, TargetPreference::Vulnerable, 2, -5),
            Self::Marauder => (80, 20, 20, TargetPreference::Balanced, 1, 0),
        };
        StrategyProfile {
            attack_threshold_percent: threshold,
            upgrade_priority_percent: priority,
            min_units_for_attack: min_units,
            target_preference,
            source_weights: SourceWeights { units, level },
        }
    }

    /// A random strategy.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// A random strategy other than `self`.
    pub fn random_other<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let others: Vec<Self> = Self::ALL.into_iter().filter(|s| *s != self).collect();
        others.choose(rng).copied().unwrap_or(self)
    }
}

impl TargetPreference {
    /// Attractiveness of `target`; higher is better.
    #[must_use]
    pub fn score(self, target: &Building) -> i64 {
        let units = i64::from(target.units);
        let level = i64::from(target.level);
        let is_player = target.owner == Owner::Player;
        match self {
            Self::Weakest => -units,
            Self::Threat if is_player => units + 20 * level,
            Self::Threat => -units,
            Self::Economic => 30 * level - units,
            Self::Vulnerable => {
                let fill = 100 * units / i64::from(target.max_units.max(1));
                100 - fill + if is_player { 25 } else { 0 }
            }
            Self::Balanced => 10 * level - units + if is_player { 15 } else { 0 },
        }
    }
}

impl SourceWeights {
    /// Score of `source`; higher is better.
    #[must_use]
    pub fn score(self, source: &Building) -> i64 {
        i64::from(source.units) * self.units + i64::from(source.level) * self.level
    }
}

/// Decision-loop memory of the AI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiState {
    /// Strategy in use.
    pub strategy: Strategy,
    /// Last time a strategy roll happened.
    pub last_strategy_change_ms: u64,
    /// Decision ticks taken so far.
    pub turns: u64,
    /// Last AI remark.
    pub last_message_ms: Option<u64>,
    /// Last upgrade-branch check.
    pub last_upgrade_check_ms: Option<u64>,
}

impl AiState {
    /// Fresh state with a random starting strategy.
    pub fn new<R: Rng + ?Sized>(now_ms: u64, rng: &mut R) -> Self {
        Self::with_strategy(Strategy::random(rng), now_ms)
    }

    /// Fresh state with a given strategy.
    #[must_use]
    pub const fn with_strategy(strategy: Strategy, now_ms: u64) -> Self {
        Self {
            strategy,
            last_strategy_change_ms: now_ms,
            turns: 0,
            last_message_ms: None,
            last_upgrade_check_ms: None,
        }
    }

    /// Difficulty in `[0, 1]` after the current turn count.
    #[must_use]
    pub fn difficulty(&self, config: &GameConfig) -> Fixed {
        let max_turns = u64::from(config.max_turns_to_full_difficulty.max(1));
        if self.turns >= max_turns {
            return Fixed::ONE;
        }
        Fixed::from_num(self.turns) / Fixed::from_num(max_turns)
    }

    /// Whether the shared remark cooldown has elapsed; stamps it if so.
    pub fn try_claim_message(&mut self, now_ms: u64, cooldown_ms: u64) -> bool {
        let ready = self
            .last_message_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= cooldown_ms);
        if ready {
            self.last_message_ms = Some(now_ms);
        }
        ready
    }
}

/// What the AI does this tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiAction {
    /// Upgrade an own building.
    Upgrade(BuildingId),
    /// Send half of `source` to `target`.
    Attack {
        /// Own building.
        source: BuildingId,
        /// Player or neutral building.
        target: BuildingId,
    },
    /// Do nothing.
    Idle,
}

/// Result of one decision tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiDecision {
    /// The action to carry out.
    pub action: AiAction,
    /// New strategy, if the AI switched this tick.
    pub switched_to: Option<Strategy>,
}

/// Run one AI decision tick over the live building list.
pub fn decide<R: Rng + ?Sized>(
    state: &mut AiState,
    buildings: &[Building],
    config: &GameConfig,
    home_base: Option<&BuildingId>,
    now_ms: u64,
    rng: &mut R,
) -> AiDecision {
    let switched_to = maybe_switch_strategy(state, config, now_ms, rng);

    state.turns += 1;
    let difficulty = state.difficulty(config);
    let profile = state.strategy.profile();

    if let Some(id) = upgrade_choice(state, &profile, buildings, config, home_base, now_ms, rng) {
        tracing::debug!(strategy = state.strategy.name(), building = %id, "ai chose upgrade");
        return AiDecision {
            action: AiAction::Upgrade(id),
            switched_to,
        };
    }

    let action = attack_choice(&profile, buildings, difficulty, rng).map_or(
        AiAction::Idle,
        |(source, target)| AiAction::Attack { source, target },
    );
    tracing::debug!(
        strategy = state.strategy.name(),
        turn = state.turns,
        ?action,
        "ai decision"
    );

    AiDecision {
        action,
        switched_to,
    }
}

fn maybe_switch_strategy<R: Rng + ?Sized>(
    state: &mut AiState,
    config: &GameConfig,
    now_ms: u64,
    rng: &mut R,
) -> Option<Strategy> {
    if now_ms.saturating_sub(state.last_strategy_change_ms) < config.strategy_switch_interval_ms {
        return None;
    }
    state.last_strategy_change_ms = now_ms;

    if rng.random_range(0..100) >= probability_percent(config.switch_chance()) {
        return None;
    }
    let next = state.strategy.random_other(rng);
    tracing::info!(from = state.strategy.name(), to = next.name(), "ai switched strategy");
    state.strategy = next;
    Some(next)
}

fn upgrade_choice<R: Rng + ?Sized>(
    state: &mut AiState,
    profile: &StrategyProfile,
    buildings: &[Building],
    config: &GameConfig,
    home_base: Option<&BuildingId>,
    now_ms: u64,
    rng: &mut R,
) -> Option<BuildingId> {
    let due = state
        .last_upgrade_check_ms
        .map_or(true, |last| now_ms.saturating_sub(last) > config.ai_upgrade_check_ms);
    if !due {
        return None;
    }
    state.last_upgrade_check_ms = Some(now_ms);

    if rng.random_range(0..100) >= profile.upgrade_priority_percent {
        return None;
    }

    buildings
        .iter()
        .find(|b| {
            b.owner == Owner::Enemy
                && Some(&b.id) != home_base
                && b.units >= UPGRADE_MIN_UNITS
                && b.level < config.max_building_level
        })
        .filter(|b| b.units >= (b.level + 1) * 20)
        .map(|b| b.id.clone())
}

/// Pick an attack for `profile` at `difficulty`, if one is worth making.
pub fn attack_choice<R: Rng + ?Sized>(
    profile: &StrategyProfile,
    buildings: &[Building],
    difficulty: Fixed,
    rng: &mut R,
) -> Option<(BuildingId, BuildingId)> {
    let ease = Fixed::ONE - difficulty.min(Fixed::ONE);
    let global_min = floor_u32(Fixed::from_num(30) * ease).max(10);
    let min_units = profile.min_units_for_attack.max(global_min);

    let source = buildings
        .iter()
        .filter(|b| b.owner == Owner::Enemy && b.units > min_units)
        .max_by(|a, b| {
            profile
                .source_weights
                .score(a)
                .cmp(&profile.source_weights.score(b))
                .then_with(|| b.id.cmp(&a.id))
        })?;

    let mut targets: Vec<&Building> = buildings
        .iter()
        .filter(|b| b.owner != Owner::Enemy)
        .collect();
    let preference = profile.target_preference;
    targets.sort_by(|a, b| {
        preference
            .score(b)
            .cmp(&preference.score(a))
            .then_with(|| a.id.cmp(&b.id))
    });
    targets.truncate(TARGET_SHORTLIST);
    let target = targets.choose(rng)?;

    let margin = Fixed::from_num(15 * profile.attack_threshold_percent) * ease / Fixed::from_num(100);
    let required = floor_u32(margin).max(5);

    let needed = u64::from(target.units + required) * 2;
    (u64::from(source.units) > needed).then(|| (source.id.clone(), target.id.clone()))
}
