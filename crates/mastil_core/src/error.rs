//! Error types for the game simulation.

use thiserror::Error;

use crate::building::{BuildingId, Owner};
use crate::economy::UpgradeRejection;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Setup and data errors. These fail fast: a game is never started from
/// data that produced one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The layout contains no buildings.
    #[error("Layout contains no buildings")]
    EmptyLayout,

    /// Two layout entries share an id.
    #[error("Duplicate building ID: {0}")]
    DuplicateBuildingId(BuildingId),

    /// A layout entry violates a building invariant.
    #[error("Invalid building '{id}': {reason}")]
    InvalidBuilding {
        /// Offending building.
        id: BuildingId,
        /// What is wrong with it.
        reason: String,
    },

    /// The layout has no starting building for an owner that needs one.
    #[error("Layout has no starting building for {0:?}")]
    MissingBase(Owner),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Player setup input was rejected.
    #[error("Invalid player setup: {0}")]
    InvalidSetup(String),

    /// Player setup was already completed for this session.
    #[error("Game already started")]
    AlreadyStarted,
}

/// Rejected player or AI command.
///
/// Commands never panic; player-facing rejections are turned into a
/// transient message by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No game in progress (not set up, paused, or over).
    #[error("Game is not active")]
    GameInactive,

    /// Referenced building does not exist.
    #[error("Unknown building: {0}")]
    UnknownBuilding(BuildingId),

    /// Source and target are the same building.
    #[error("Cannot send units to the same building")]
    SameBuilding,

    /// The source garrison is too small to split.
    #[error("Not enough units in {0} to send")]
    NotEnoughUnits(BuildingId),

    /// Neutral buildings only move units between neutral buildings.
    #[error("Neutral building {0} cannot attack")]
    NeutralCannotAttack(BuildingId),

    /// The acting side does not own the building.
    #[error("Building {id} is not owned by {owner:?}")]
    NotOwned {
        /// Building acted upon.
        id: BuildingId,
        /// Side that tried to act.
        owner: Owner,
    },

    /// The upgrade economy refused the upgrade.
    #[error(transparent)]
    Upgrade(#[from] UpgradeRejection),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_building() {
        let err = CommandError::UnknownBuilding(BuildingId::from("b9"));
        assert_eq!(err.to_string(), "Unknown building: b9");

        let err = GameError::InvalidBuilding {
            id: BuildingId::from("n1"),
            reason: "units exceed capacity".into(),
        };
        assert!(err.to_string().contains("n1"));
    }

    #[test]
    fn test_upgrade_rejection_converts() {
        let err: CommandError = UpgradeRejection::MaxLevel.into();
        assert!(matches!(err, CommandError::Upgrade(UpgradeRejection::MaxLevel)));
    }
}
