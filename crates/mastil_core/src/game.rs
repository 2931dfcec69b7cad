//! The game orchestrator.
//!
//! [`Game`] owns the canonical state of one session: buildings, selection,
//! message board, AI and neutral state, transfers in flight and the seeded
//! RNG. Every mutation goes through one of its commands or clock handlers,
//! and every handler re-reads the live state when it runs.
//!
//! # Lifecycle
//!
//! ```text
//! AwaitingSetup --handle_player_setup--> Playing --(no enemy)--> Victory
//!                                            |
//!                                            +--(no player)--> Defeat
//! ```
//!
//! [`Game::restart_game`] returns a started game to a fresh `Playing` state.
//!
//! # Example
//!
//! ```
//! use mastil_core::prelude::*;
//!
//! let mut game = Game::new(GameConfig::default(), Layout::standard(), 7).unwrap();
//! game.handle_player_setup("Ada", Element::Fire, 0).unwrap();
//! game.send_units(&BuildingId::from("b1"), &BuildingId::from("b5"), 0).unwrap();
//! game.run_clock(Clock::Frame, 60_000);
//! assert_eq!(game.building(&BuildingId::from("b5")).unwrap().owner, Owner::Player);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ai::{self, AiAction, AiState};
use crate::building::{count_owned, find, Building, BuildingId, Element, Owner};
use crate::clock::Clock;
use crate::combat::{resolve_arrival, Arrival, ArrivalReport};
use crate::commentary::{
    CommentCategory, CommentaryDirector, Message, MessageBoard, Priority, Speaker, Voice,
};
use crate::config::GameConfig;
use crate::data::Layout;
use crate::economy::{self, UpgradeReceipt};
use crate::error::{CommandError, GameError, Result};
use crate::events::{GameEvent, GameOutcome, SoundCue};
use crate::neutral::{self, NeutralState};
use crate::production;
use crate::selection::{ClickOutcome, Selection};
use crate::snapshot::GameSnapshot;
use crate::transit::{Transfer, TransferId, TransitCoordinator};

/// Longest accepted player name, in characters.
pub const MAX_NAME_CHARS: usize = 24;

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the player's name and element.
    AwaitingSetup,
    /// In progress.
    Playing,
    /// The player won.
    Victory,
    /// The player lost.
    Defeat,
}

impl Phase {
    /// Outcome of a finished game.
    #[must_use]
    pub const fn outcome(self) -> Option<GameOutcome> {
        match self {
            Self::Victory => Some(GameOutcome::Victory),
            Self::Defeat => Some(GameOutcome::Defeat),
            Self::AwaitingSetup | Self::Playing => None,
        }
    }
}

/// Player identity chosen at setup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Display name.
    pub name: String,
    /// Chosen element.
    pub element: Element,
    /// Element assigned to the AI.
    pub ai_element: Element,
}

/// One game session.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    layout: Layout,
    home_base: Option<BuildingId>,
    buildings: Vec<Building>,
    phase: Phase,
    paused: bool,
    playtime_gate: bool,
    profile: Option<PlayerProfile>,
    selection: Selection,
    board: MessageBoard,
    director: CommentaryDirector,
    ai: AiState,
    neutral: NeutralState,
    transit: TransitCoordinator,
    grace_until_ms: Option<u64>,
    started_at_ms: u64,
    rng: SmallRng,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create a game from validated data. Nothing moves until
    /// [`Game::handle_player_setup`] is called.
    pub fn new(config: GameConfig, layout: Layout, seed: u64) -> Result<Self> {
        config.validate()?;
        layout.validate(&config)?;

        let mut rng = SmallRng::seed_from_u64(seed);
        let ai = AiState::new(0, &mut rng);
        let buildings = layout.spawn(&config);
        let home_base = layout.home_base().cloned();

        Ok(Self {
            config,
            layout,
            home_base,
            buildings,
            phase: Phase::AwaitingSetup,
            paused: false,
            playtime_gate: false,
            profile: None,
            selection: Selection::Idle,
            board: MessageBoard::default(),
            director: CommentaryDirector::new(0),
            ai,
            neutral: NeutralState::new(0),
            transit: TransitCoordinator::new(),
            grace_until_ms: None,
            started_at_ms: 0,
            rng,
            events: Vec::new(),
        })
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Register the player and start the game.
    pub fn handle_player_setup(&mut self, name: &str, element: Element, now_ms: u64) -> Result<()> {
        if self.phase != Phase::AwaitingSetup {
            return Err(GameError::AlreadyStarted);
        }

        let name = name.trim();
        let chars = name.chars().count();
        if chars == 0 {
            return Err(GameError::InvalidSetup("name must not be empty".into()));
        }
        if chars > MAX_NAME_CHARS {
            return Err(GameError::InvalidSetup(format!(
                "name must be at most {MAX_NAME_CHARS} characters"
            )));
        }

        let others: Vec<Element> = Element::ALL
            .into_iter()
            .filter(|e| *e != element)
            .collect();
        let ai_element = others.choose(&mut self.rng).copied().unwrap_or(element);

        self.profile = Some(PlayerProfile {
            name: name.to_owned(),
            element,
            ai_element,
        });
        tracing::info!(player = name, ?element, ?ai_element, "player setup complete");
        self.start_session(now_ms);
        Ok(())
    }

    /// Reset the map and every piece of session state, keeping the
    /// player's name and elements.
    pub fn restart_game(&mut self, now_ms: u64) {
        if self.profile.is_none() {
            tracing::warn!("restart requested before player setup");
            return;
        }
        tracing::info!(now_ms, "game restarted");
        self.start_session(now_ms);
    }

    /// Suspend or resume production, AI and neutral clocks. Transfers in
    /// flight keep moving.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::info!(paused, "pause toggled");
        }
        self.paused = paused;
    }

    /// External playtime gate; while set, neutral autonomy is suspended.
    pub fn set_playtime_gate(&mut self, active: bool) {
        self.playtime_gate = active;
    }

    /// Feed a click on `id` into the selection protocol.
    pub fn select_building(&mut self, id: &BuildingId, now_ms: u64) -> ClickOutcome {
        if !self.is_active() {
            return ClickOutcome::Ignored;
        }

        let clicked = self.building(id);
        let exists = clicked.is_some();
        let player_owned = clicked.is_some_and(|b| b.owner == Owner::Player);

        let outcome = self.selection.click(id, exists, player_owned);
        match &outcome {
            ClickOutcome::Armed(_) => {
                self.events.push(GameEvent::Sound(SoundCue::Select));
                self.post(
                    Speaker::System,
                    "Now choose a building to send half of the garrison to.",
                    now_ms,
                );
            }
            ClickOutcome::Send { source, target } => {
                let still_owned = self
                    .building(source)
                    .is_some_and(|b| b.owner == Owner::Player);
                if still_owned {
                    // Rejections are already shown on the board.
                    if let Err(err) = self.send_units(source, target, now_ms) {
                        tracing::debug!(%source, %target, %err, "click send refused");
                    }
                }
            }
            ClickOutcome::Disarmed | ClickOutcome::Ignored => {}
        }
        outcome
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selection.clear();
    }

    /// Upgrade a player building.
    pub fn upgrade_building(
        &mut self,
        id: &BuildingId,
        now_ms: u64,
    ) -> std::result::Result<UpgradeReceipt, CommandError> {
        let result = self.upgrade_as(Owner::Player, id);
        if let Err(err) = &result {
            self.post(Speaker::System, err.to_string(), now_ms);
        }
        result
    }

    /// Send half of `source`'s garrison to `target`.
    ///
    /// Rejections of player-owned sources are also shown on the board.
    pub fn send_units(
        &mut self,
        source: &BuildingId,
        target: &BuildingId,
        now_ms: u64,
    ) -> std::result::Result<TransferId, CommandError> {
        let result = self.try_send(source, target, now_ms);
        if let Err(err) = &result {
            if self.building(source).is_some_and(|b| b.owner == Owner::Player) {
                self.post(Speaker::System, err.to_string(), now_ms);
            }
        }
        result
    }

    // ========================================================================
    // Clock handlers
    // ========================================================================

    /// Run one tick of `clock` at `now_ms`.
    pub fn run_clock(&mut self, clock: Clock, now_ms: u64) {
        match clock {
            Clock::Production => self.on_production_tick(),
            Clock::AiDecision => self.on_ai_tick(now_ms),
            Clock::NeutralRegen => self.on_neutral_regen(),
            Clock::NeutralUpgrade => self.on_neutral_upgrade(now_ms),
            Clock::NeutralAid => self.on_neutral_aid(now_ms),
            Clock::NeutralChatter => self.on_neutral_chatter(now_ms),
            Clock::Frame => self.on_frame(now_ms),
        }
    }

    /// Owned buildings produce units.
    pub fn on_production_tick(&mut self) {
        if !self.is_active() {
            return;
        }
        production::produce_units(&mut self.buildings);
    }

    /// The AI takes one decision.
    pub fn on_ai_tick(&mut self, now_ms: u64) {
        if !self.is_active() {
            return;
        }

        let previous = self.ai.strategy;
        let decision = ai::decide(
            &mut self.ai,
            &self.buildings,
            &self.config,
            self.home_base.as_ref(),
            now_ms,
            &mut self.rng,
        );

        if let Some(next) = decision.switched_to {
            self.events.push(GameEvent::StrategyChanged {
                from: previous,
                to: next,
            });
            self.ai.last_message_ms = Some(now_ms);
            self.post_comment(CommentCategory::AiStrategy, now_ms);
        }

        match decision.action {
            AiAction::Upgrade(id) => {
                if let Err(err) = self.upgrade_as(Owner::Enemy, &id) {
                    tracing::debug!(building = %id, %err, "ai upgrade refused");
                }
            }
            AiAction::Attack { source, target } => {
                let at_player = self.building(&target).is_some_and(|b| b.owner == Owner::Player);
                match self.try_send(&source, &target, now_ms) {
                    Ok(_) => {
                        let category = if at_player {
                            CommentCategory::AiTaunt
                        } else {
                            CommentCategory::AiNeutral
                        };
                        self.ai_remark(category, now_ms);
                    }
                    Err(err) => tracing::debug!(%source, %target, %err, "ai attack refused"),
                }
            }
            AiAction::Idle => {}
        }
        self.check_game_over();
    }

    /// Neutral buildings regenerate one unit.
    pub fn on_neutral_regen(&mut self) {
        if !self.neutral_active() {
            return;
        }
        production::regenerate_neutrals(&mut self.buildings);
    }

    /// A rich neutral building may upgrade itself.
    pub fn on_neutral_upgrade(&mut self, now_ms: u64) {
        if !self.neutral_active() {
            return;
        }
        let Some(id) = neutral::plan_self_upgrade(
            &mut self.neutral,
            &self.buildings,
            &self.config,
            now_ms,
            &mut self.rng,
        ) else {
            return;
        };
        let config = &self.config;
        if let Some(building) = self.buildings.iter_mut().find(|b| b.id == id) {
            let receipt = economy::apply_self_upgrade(building, config);
            tracing::info!(building = %id, level = receipt.new_level, "neutral self-upgrade");
            self.events.push(GameEvent::Upgraded {
                building: id,
                owner: Owner::Neutral,
                level: receipt.new_level,
            });
        }
    }

    /// A well-stocked neutral may ship units to the neediest neutral.
    pub fn on_neutral_aid(&mut self, now_ms: u64) {
        if !self.neutral_active() {
            return;
        }
        let Some(plan) = neutral::plan_mutual_aid(
            &mut self.neutral,
            &self.buildings,
            &self.config,
            now_ms,
            &mut self.rng,
        ) else {
            return;
        };
        let (Some(si), Some(ti)) = (self.index_of(&plan.source), self.index_of(&plan.target))
        else {
            return;
        };

        let units = plan.units.min(self.buildings[si].units);
        self.buildings[si].units -= units;
        self.dispatch(si, ti, units, Owner::Neutral, now_ms);
        tracing::debug!(source = %plan.source, target = %plan.target, units, "neutral mutual aid");
        self.direct(Voice::Neutral, Priority::Medium, CommentCategory::NeutralSupport, now_ms);
    }

    /// Neutrals may say something.
    pub fn on_neutral_chatter(&mut self, now_ms: u64) {
        if !self.neutral_active() {
            return;
        }
        if !self.director.can_speak(Priority::Low, now_ms) {
            return;
        }
        if neutral::should_chatter(
            &self.neutral,
            &self.buildings,
            &self.config,
            now_ms,
            &mut self.rng,
        ) && self.direct(Voice::Neutral, Priority::Low, CommentCategory::NeutralIdle, now_ms)
        {
            self.neutral.last_chatter_ms = now_ms;
        }
    }

    /// Land due transfers, expire the message and the grace window, and
    /// give the commentary a chance to speak.
    ///
    /// Runs while paused; commentary does not.
    pub fn on_frame(&mut self, now_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }

        self.board.expire(now_ms);
        self.expire_grace(now_ms);
        self.ambient_commentary(now_ms);

        for transfer in self.transit.take_completed(now_ms) {
            self.land(transfer, now_ms);
            if self.phase != Phase::Playing {
                break;
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the game is set up, running and not paused.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Playing && !self.paused
    }

    /// Whether the game has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.phase.outcome().is_some()
    }

    /// Whether the game is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Every building, in layout order.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Look up a building.
    #[must_use]
    pub fn building(&self, id: &BuildingId) -> Option<&Building> {
        find(&self.buildings, id)
    }

    /// Cost of upgrading `id`, or `None` when unknown or at max level.
    #[must_use]
    pub fn upgrade_cost(&self, id: &BuildingId) -> Option<u32> {
        self.building(id)
            .filter(|b| b.level < self.config.max_building_level)
            .map(|b| economy::upgrade_cost(b.level, &self.config))
    }

    /// Selection state.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Message currently shown.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.board.current()
    }

    /// AI memory.
    #[must_use]
    pub const fn ai_state(&self) -> &AiState {
        &self.ai
    }

    /// Neutral cooldowns.
    #[must_use]
    pub const fn neutral_state(&self) -> &NeutralState {
        &self.neutral
    }

    /// Transfers in flight.
    #[must_use]
    pub const fn transit(&self) -> &TransitCoordinator {
        &self.transit
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Player identity, once set up.
    #[must_use]
    pub const fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    /// The AI home base.
    #[must_use]
    pub const fn home_base(&self) -> Option<&BuildingId> {
        self.home_base.as_ref()
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view at `now_ms`.
    #[must_use]
    pub fn snapshot(&self, now_ms: u64) -> GameSnapshot {
        let started = self.phase != Phase::AwaitingSetup;
        GameSnapshot {
            phase: self.phase,
            buildings: self.buildings.clone(),
            selected_building_id: self.selection.armed().cloned(),
            message: self.board.current().cloned(),
            game_over: self.is_over(),
            game_over_message: self.phase.outcome().map(|o| o.message().to_owned()),
            player_building_count: count_owned(&self.buildings, Owner::Player),
            enemy_building_count: count_owned(&self.buildings, Owner::Enemy),
            transfers: self.transit.views(now_ms),
            ai_strategy: started.then_some(self.ai.strategy),
            elapsed_ms: if started {
                now_ms.saturating_sub(self.started_at_ms)
            } else {
                0
            },
            paused: self.paused,
            player_name: self.profile.as_ref().map(|p| p.name.clone()),
            player_element: self.profile.as_ref().map(|p| p.element),
            ai_element: self.profile.as_ref().map(|p| p.ai_element),
        }
    }

    /// Hash of the full simulation state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.phase.hash(&mut hasher);
        self.paused.hash(&mut hasher);
        self.playtime_gate.hash(&mut hasher);
        self.buildings.hash(&mut hasher);
        self.selection.hash(&mut hasher);
        self.board.hash(&mut hasher);
        self.director.hash(&mut hasher);
        self.ai.hash(&mut hasher);
        self.neutral.hash(&mut hasher);
        self.transit.hash(&mut hasher);
        self.grace_until_ms.hash(&mut hasher);
        hasher.finish()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn start_session(&mut self, now_ms: u64) {
        let mut buildings = self.layout.spawn(&self.config);
        if let Some(profile) = &self.profile {
            for building in &mut buildings {
                building.element = match building.owner {
                    Owner::Player => Some(profile.element),
                    Owner::Enemy => Some(profile.ai_element),
                    Owner::Neutral => None,
                };
            }
        }
        self.buildings = buildings;
        self.selection.clear();
        self.board.clear();
        self.director = CommentaryDirector::new(now_ms);
        self.ai = AiState::new(now_ms, &mut self.rng);
        self.neutral = NeutralState::new(now_ms);
        self.transit.clear();
        self.grace_until_ms = self
            .buildings
            .iter()
            .any(|b| b.is_invulnerable)
            .then_some(now_ms.saturating_add(self.config.enemy_base_grace_ms));
        self.started_at_ms = now_ms;
        self.paused = false;
        self.playtime_gate = false;
        self.phase = Phase::Playing;

        let name = self.profile.as_ref().map_or("Commander", |p| p.name.as_str());
        let welcome = format!("Welcome, {name}! Capture every enemy building to win.");
        self.post(Speaker::System, welcome, now_ms);
        tracing::info!(strategy = self.ai.strategy.name(), "game started");
    }

    fn neutral_active(&self) -> bool {
        self.is_active() && !self.playtime_gate
    }

    fn index_of(&self, id: &BuildingId) -> Option<usize> {
        self.buildings.iter().position(|b| &b.id == id)
    }

    fn upgrade_as(
        &mut self,
        owner: Owner,
        id: &BuildingId,
    ) -> std::result::Result<UpgradeReceipt, CommandError> {
        if !self.is_active() {
            return Err(CommandError::GameInactive);
        }
        let index = self
            .index_of(id)
            .ok_or_else(|| CommandError::UnknownBuilding(id.clone()))?;
        let building = &mut self.buildings[index];
        if building.owner != owner {
            return Err(CommandError::NotOwned {
                id: id.clone(),
                owner,
            });
        }

        let receipt = economy::try_upgrade(building, &self.config)?;
        tracing::info!(building = %id, ?owner, level = receipt.new_level, cost = receipt.cost, "building upgraded");
        self.events.push(GameEvent::Upgraded {
            building: id.clone(),
            owner,
            level: receipt.new_level,
        });
        self.check_game_over();
        Ok(receipt)
    }

    fn try_send(
        &mut self,
        source: &BuildingId,
        target: &BuildingId,
        now_ms: u64,
    ) -> std::result::Result<TransferId, CommandError> {
        if !self.is_active() {
            return Err(CommandError::GameInactive);
        }
        let si = self
            .index_of(source)
            .ok_or_else(|| CommandError::UnknownBuilding(source.clone()))?;
        let ti = self
            .index_of(target)
            .ok_or_else(|| CommandError::UnknownBuilding(target.clone()))?;
        if si == ti {
            return Err(CommandError::SameBuilding);
        }

        let from = &self.buildings[si];
        if from.units <= 1 {
            return Err(CommandError::NotEnoughUnits(source.clone()));
        }
        if from.owner == Owner::Neutral && self.buildings[ti].owner != Owner::Neutral {
            return Err(CommandError::NeutralCannotAttack(source.clone()));
        }

        let owner = from.owner;
        let units = from.units / 2;
        self.buildings[si].units -= units;
        self.events.push(GameEvent::Sound(SoundCue::Attack));
        let id = self.dispatch(si, ti, units, owner, now_ms);
        self.check_game_over();
        Ok(id)
    }

    fn dispatch(&mut self, si: usize, ti: usize, units: u32, owner: Owner, now_ms: u64) -> TransferId {
        let (source, target) = (&self.buildings[si], &self.buildings[ti]);
        let id = self
            .transit
            .dispatch(source, target, units, owner, now_ms, &self.config);
        self.events.push(GameEvent::TransferDispatched {
            id,
            source: source.id.clone(),
            target: target.id.clone(),
            units,
            owner,
        });
        id
    }

    fn land(&mut self, transfer: Transfer, now_ms: u64) {
        let Some(report) =
            resolve_arrival(&mut self.buildings, &transfer.target, transfer.units, transfer.owner)
        else {
            return;
        };

        self.events.push(GameEvent::TransferResolved {
            id: transfer.id,
            target: report.target.clone(),
            outcome: report.outcome,
        });
        self.react_to_arrival(&report, now_ms);
        self.check_game_over();
    }

    fn react_to_arrival(&mut self, report: &ArrivalReport, now_ms: u64) {
        let Some(loser) = report.loser() else {
            return;
        };
        let winner = match report.outcome {
            Arrival::Conquered { .. } => report.attacker,
            _ => Owner::Neutral,
        };
        if winner == loser {
            return;
        }
        tracing::info!(building = %report.target, from = ?loser, to = ?winner, "building changed hands");
        self.events.push(GameEvent::OwnerChanged {
            building: report.target.clone(),
            from: loser,
            to: winner,
        });

        let report_line = match (winner, loser) {
            (Owner::Player, _) => Some(CommentCategory::PlayerCaptured),
            (_, Owner::Player) => Some(CommentCategory::PlayerLost),
            (Owner::Enemy, _) => Some(CommentCategory::EnemySpreads),
            _ => None,
        };
        if let Some(category) = report_line {
            if self.direct(Voice::Event, Priority::High, category, now_ms) {
                return;
            }
        }

        if winner == Owner::Enemy {
            self.ai_remark(CommentCategory::AiConquest, now_ms);
        } else if loser == Owner::Enemy {
            self.ai_remark(CommentCategory::AiLoss, now_ms);
        }
    }

    fn ambient_commentary(&mut self, now_ms: u64) {
        if !self.is_active() {
            return;
        }
        if self.director.take_opening_taunt(now_ms) {
            self.direct(Voice::Enemy, Priority::High, CommentCategory::AiTaunt, now_ms);
            return;
        }
        let Some(voice) = self.director.ambient_voice(now_ms, &mut self.rng) else {
            return;
        };
        let battle = !self.transit.is_empty() && self.rng.random_bool(0.5);
        let category = match voice {
            Voice::Neutral if battle => CommentCategory::Battle,
            Voice::Neutral => CommentCategory::NeutralIdle,
            Voice::Enemy | Voice::Event => CommentCategory::AiTaunt,
        };
        self.direct(voice, Priority::Low, category, now_ms);
    }

    fn expire_grace(&mut self, now_ms: u64) {
        let Some(until) = self.grace_until_ms else {
            return;
        };
        if now_ms < until {
            return;
        }
        self.grace_until_ms = None;
        for building in self.buildings.iter_mut().filter(|b| b.is_invulnerable) {
            building.is_invulnerable = false;
            tracing::info!(building = %building.id, "enemy base grace window over");
            self.events.push(GameEvent::GraceExpired {
                building: building.id.clone(),
            });
        }
    }

    fn check_game_over(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        let players = count_owned(&self.buildings, Owner::Player);
        let enemies = count_owned(&self.buildings, Owner::Enemy);
        let outcome = if enemies == 0 && players > 0 {
            GameOutcome::Victory
        } else if players == 0 && enemies > 0 {
            GameOutcome::Defeat
        } else {
            return;
        };

        self.phase = match outcome {
            GameOutcome::Victory => Phase::Victory,
            GameOutcome::Defeat => Phase::Defeat,
        };
        self.selection.clear();
        self.events.push(GameEvent::GameOver(outcome));
        tracing::info!(?outcome, "game over");
    }

    fn ai_remark(&mut self, category: CommentCategory, now_ms: u64) {
        if self
            .ai
            .try_claim_message(now_ms, self.config.ai_message_cooldown_ms)
        {
            self.post_comment(category, now_ms);
        }
    }

    /// Post a cosmetic line if the director allows it.
    fn direct(
        &mut self,
        voice: Voice,
        priority: Priority,
        category: CommentCategory,
        now_ms: u64,
    ) -> bool {
        if !self.is_active() || !self.director.try_speak(voice, priority, now_ms, &mut self.rng) {
            return false;
        }
        self.post_comment(category, now_ms);
        true
    }

    fn post_comment(&mut self, category: CommentCategory, now_ms: u64) {
        let (speaker, line) = category.pick(&mut self.rng);
        self.post(speaker, line, now_ms);
    }

    fn post(&mut self, speaker: Speaker, text: impl Into<String>, now_ms: u64) {
        self.board
            .post(speaker, text, now_ms, self.config.message_duration_ms);
    }
}
