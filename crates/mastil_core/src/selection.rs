//! Two-click selection protocol.
//!
//! The first click on a player building arms it as a source; the second
//! click either disarms it (same building) or sends units to the clicked
//! building. Ownership of the clicked building is checked by the caller,
//! which knows the live map.

use serde::{Deserialize, Serialize};

use crate::building::BuildingId;

/// Selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    Idle,
    /// A source building is selected.
    Armed(BuildingId),
}

/// What a click did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A source was selected.
    Armed(BuildingId),
    /// The selection was cleared without action.
    Disarmed,
    /// Units should be sent from `source` to `target`.
    Send {
        /// Armed building.
        source: BuildingId,
        /// Clicked building.
        target: BuildingId,
    },
    /// Nothing happened.
    Ignored,
}

impl Selection {
    /// Feed a click into the state machine.
    ///
    /// `exists` tells whether `clicked` is on the map; `player_owned`
    /// whether the player owns it.
    pub fn click(&mut self, clicked: &BuildingId, exists: bool, player_owned: bool) -> ClickOutcome {
        match std::mem::take(self) {
            Self::Idle if exists && player_owned => {
                *self = Self::Armed(clicked.clone());
                ClickOutcome::Armed(clicked.clone())
            }
            Self::Idle => ClickOutcome::Ignored,
            Self::Armed(source) if &source == clicked || !exists => ClickOutcome::Disarmed,
            Self::Armed(source) => ClickOutcome::Send {
                source,
                target: clicked.clone(),
            },
        }
    }

    /// Currently armed building.
    #[must_use]
    pub fn armed(&self) -> Option<&BuildingId> {
        match self {
            Self::Idle => None,
            Self::Armed(id) => Some(id),
        }
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        *self = Self::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> BuildingId {
        BuildingId::from(s)
    }

    #[test]
    fn test_idle_click_on_own_building_arms() {
        let mut selection = Selection::Idle;
        assert_eq!(
            selection.click(&id("b1"), true, true),
            ClickOutcome::Armed(id("b1"))
        );
        assert_eq!(selection.armed(), Some(&id("b1")));
    }

    #[test]
    fn test_idle_click_on_foreign_building_is_ignored() {
        let mut selection = Selection::Idle;
        assert_eq!(selection.click(&id("b2"), true, false), ClickOutcome::Ignored);
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_same_building_disarms() {
        let mut selection = Selection::Armed(id("b1"));
        assert_eq!(selection.click(&id("b1"), true, true), ClickOutcome::Disarmed);
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_second_click_sends() {
        let mut selection = Selection::Armed(id("b1"));
        assert_eq!(
            selection.click(&id("h1"), true, false),
            ClickOutcome::Send {
                source: id("b1"),
                target: id("h1")
            }
        );
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_unknown_target_disarms() {
        let mut selection = Selection::Armed(id("b1"));
        assert_eq!(selection.click(&id("zz"), false, false), ClickOutcome::Disarmed);
        assert_eq!(selection, Selection::Idle);
    }
}
