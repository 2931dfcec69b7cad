//! Events emitted by the game for hosts, loggers and audio.

use serde::{Deserialize, Serialize};

use crate::ai::Strategy;
use crate::building::{BuildingId, Owner};
use crate::combat::Arrival;
use crate::transit::TransferId;

/// Sound cue for the audio side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Units were sent.
    Attack,
    /// A building was selected.
    Select,
}

/// How a finished game ended, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The enemy holds no buildings.
    Victory,
    /// The player holds no buildings.
    Defeat,
}

impl GameOutcome {
    /// Banner text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Victory => "Victory! You have conquered every enemy building.",
            Self::Defeat => "Defeat! The enemy has taken all of your buildings.",
        }
    }
}

/// Something that happened during a command or clock tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// Play a sound.
    Sound(SoundCue),
    /// Units left a building.
    TransferDispatched {
        /// Transfer id.
        id: TransferId,
        /// Origin.
        source: BuildingId,
        /// Destination.
        target: BuildingId,
        /// Units sent.
        units: u32,
        /// Owner of the units.
        owner: Owner,
    },
    /// A transfer landed.
    TransferResolved {
        /// Transfer id.
        id: TransferId,
        /// Destination.
        target: BuildingId,
        /// What happened there.
        outcome: Arrival,
    },
    /// A building changed hands.
    OwnerChanged {
        /// Building.
        building: BuildingId,
        /// Previous owner.
        from: Owner,
        /// New owner.
        to: Owner,
    },
    /// A building gained a level.
    Upgraded {
        /// Building.
        building: BuildingId,
        /// Its owner.
        owner: Owner,
        /// Level reached.
        level: u32,
    },
    /// The AI switched strategy.
    StrategyChanged {
        /// Old strategy.
        from: Strategy,
        /// New strategy.
        to: Strategy,
    },
    /// The AI home base lost its shield.
    GraceExpired {
        /// The home base.
        building: BuildingId,
    },
    /// The game ended.
    GameOver(GameOutcome),
}
