//! Read-only view of a game for renderers and hosts.

use serde::{Deserialize, Serialize};

use crate::ai::Strategy;
use crate::building::{Building, BuildingId, Element};
use crate::commentary::Message;
use crate::game::Phase;
use crate::transit::TransferView;

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Every building, in layout order.
    pub buildings: Vec<Building>,
    /// Armed source building, if any.
    pub selected_building_id: Option<BuildingId>,
    /// Message currently shown.
    pub message: Option<Message>,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Victory or defeat banner.
    pub game_over_message: Option<String>,
    /// Buildings held by the player.
    pub player_building_count: usize,
    /// Buildings held by the AI.
    pub enemy_building_count: usize,
    /// Transfers in flight.
    pub transfers: Vec<TransferView>,
    /// AI strategy in use, once the game has started.
    pub ai_strategy: Option<Strategy>,
    /// Time since setup or the last restart.
    pub elapsed_ms: u64,
    /// Whether the simulation clocks are paused.
    pub paused: bool,
    /// Player name, once set up.
    pub player_name: Option<String>,
    /// Player element, once set up.
    pub player_element: Option<Element>,
    /// AI element, once set up.
    pub ai_element: Option<Element>,
}
