//! Virtual-time driver.
//!
//! [`Simulation`] owns a [`Game`] and a [`ClockSchedule`] and fires every
//! clock at its exact virtual due time. Clocks due at the same instant fire
//! in [`Clock`] declaration order, so a run is fully reproducible from its
//! seed and command script. Headless matches and tests use this driver; the
//! real-time runtime drives the same [`Game`] from tokio intervals instead.
//!
//! # Example
//!
//! ```
//! use mastil_core::prelude::*;
//!
//! let mut sim = Simulation::new(GameConfig::default(), Layout::standard(), 1).unwrap();
//! sim.setup("Ada", Element::Water).unwrap();
//! sim.advance(10_000);
//! assert_eq!(sim.game().building(&BuildingId::from("b1")).unwrap().units, 30);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::building::{BuildingId, Element};
use crate::clock::{Clock, ClockSchedule};
use crate::config::GameConfig;
use crate::data::Layout;
use crate::economy::UpgradeReceipt;
use crate::error::{CommandError, Result};
use crate::events::GameEvent;
use crate::game::Game;
use crate::selection::ClickOutcome;
use crate::snapshot::GameSnapshot;
use crate::transit::TransferId;

/// A game driven in virtual time.
#[derive(Debug, Clone)]
pub struct Simulation {
    game: Game,
    schedule: ClockSchedule,
    now_ms: u64,
}

impl Simulation {
    /// Create a simulation at virtual time 0.
    pub fn new(config: GameConfig, layout: Layout, seed: u64) -> Result<Self> {
        Ok(Self::from_game(Game::new(config, layout, seed)?))
    }

    /// Drive an existing game from virtual time 0.
    #[must_use]
    pub fn from_game(game: Game) -> Self {
        let schedule = ClockSchedule::new(game.config(), 0);
        Self {
            game,
            schedule,
            now_ms: 0,
        }
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// The driven game.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Advance virtual time by `delta_ms`, firing every due clock.
    pub fn advance(&mut self, delta_ms: u64) {
        self.advance_to(self.now_ms.saturating_add(delta_ms));
    }

    /// Advance virtual time to `target_ms`, firing every due clock.
    pub fn advance_to(&mut self, target_ms: u64) {
        while let Some((due, clock)) = self.schedule.pop_due(target_ms) {
            self.now_ms = due;
            self.game.run_clock(clock, due);
        }
        self.now_ms = self.now_ms.max(target_ms);
    }

    /// Advance until the game ends or `limit_ms` is reached. Returns
    /// whether the game ended.
    pub fn run_until_over(&mut self, limit_ms: u64) -> bool {
        while !self.game.is_over() {
            let (due, _) = self.schedule.peek();
            if due > limit_ms {
                self.advance_to(limit_ms);
                return false;
            }
            self.advance_to(due);
        }
        true
    }

    /// When `clock` fires next.
    #[must_use]
    pub fn next_due(&self, clock: Clock) -> u64 {
        self.schedule.next_due(clock)
    }

    // ========================================================================
    // Commands at the current virtual time
    // ========================================================================

    /// Register the player; clocks restart their phase from now.
    pub fn setup(&mut self, name: &str, element: Element) -> Result<()> {
        self.game.handle_player_setup(name, element, self.now_ms)?;
        self.schedule.reset(self.now_ms);
        Ok(())
    }

    /// Restart the game; clocks restart their phase from now.
    pub fn restart(&mut self) {
        self.game.restart_game(self.now_ms);
        self.schedule.reset(self.now_ms);
    }

    /// See [`Game::select_building`].
    pub fn select_building(&mut self, id: &BuildingId) -> ClickOutcome {
        self.game.select_building(id, self.now_ms)
    }

    /// See [`Game::deselect`].
    pub fn deselect(&mut self) {
        self.game.deselect();
    }

    /// See [`Game::send_units`].
    pub fn send_units(
        &mut self,
        source: &BuildingId,
        target: &BuildingId,
    ) -> std::result::Result<TransferId, CommandError> {
        self.game.send_units(source, target, self.now_ms)
    }

    /// See [`Game::upgrade_building`].
    pub fn upgrade_building(
        &mut self,
        id: &BuildingId,
    ) -> std::result::Result<UpgradeReceipt, CommandError> {
        self.game.upgrade_building(id, self.now_ms)
    }

    /// See [`Game::set_paused`].
    pub fn set_paused(&mut self, paused: bool) {
        self.game.set_paused(paused);
    }

    /// See [`Game::set_playtime_gate`].
    pub fn set_playtime_gate(&mut self, active: bool) {
        self.game.set_playtime_gate(active);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Snapshot at the current virtual time.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot(self.now_ms)
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.game.drain_events()
    }

    /// Hash of the game state and the virtual clock.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.now_ms.hash(&mut hasher);
        self.schedule.hash(&mut hasher);
        self.game.state_hash().hash(&mut hasher);
        hasher.finish()
    }
}
