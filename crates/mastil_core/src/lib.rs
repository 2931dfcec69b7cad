//! # Mastil Core
//!
//! Deterministic simulation core for Mastil, a real-time territory
//! conquest game.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No system randomness (one seeded RNG per game)
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! This separation enables:
//! - A real-time host driving clocks from timers
//! - Headless, accelerated matches in virtual time
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`building`] - The building entity
//! - [`combat`] - Arrival resolution
//! - [`economy`] - Upgrade costs and level advance
//! - [`production`] - Unit production and neutral regeneration
//! - [`neutral`] - Neutral autonomy planners
//! - [`ai`] - AI opponent policy
//! - [`transit`] - Units in flight
//! - [`game`] - The orchestrator owning all state
//! - [`clock`] / [`simulation`] - Clocks and the virtual-time driver
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod building;
pub mod clock;
pub mod combat;
pub mod commentary;
pub mod config;
pub mod data;
pub mod economy;
pub mod error;
pub mod events;
pub mod game;
pub mod math;
pub mod neutral;
pub mod production;
pub mod selection;
pub mod simulation;
pub mod snapshot;
pub mod transit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{AiAction, AiState, Strategy, TargetPreference};
    pub use crate::building::{Building, BuildingId, Element, Owner};
    pub use crate::clock::{Clock, ClockSchedule};
    pub use crate::combat::{Arrival, ArrivalReport};
    pub use crate::commentary::{Message, Speaker};
    pub use crate::config::{GameConfig, TransitTiming};
    pub use crate::data::{Layout, LayoutEntry};
    pub use crate::economy::{UpgradeReceipt, UpgradeRejection};
    pub use crate::error::{CommandError, GameError, Result};
    pub use crate::events::{GameEvent, GameOutcome, SoundCue};
    pub use crate::game::{Game, Phase};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::selection::{ClickOutcome, Selection};
    pub use crate::simulation::Simulation;
    pub use crate::snapshot::GameSnapshot;
    pub use crate::transit::{TransferId, TransferView};
}
