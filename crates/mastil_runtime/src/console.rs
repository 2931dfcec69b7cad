//! Line-oriented text commands for the terminal host.

use mastil_core::building::{BuildingId, Element};
use mastil_core::snapshot::GameSnapshot;
use thiserror::Error;

use crate::session::SessionCommand;

/// A parsed console line.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Register the player.
    Setup {
        /// Player name.
        name: String,
        /// Player element.
        element: Element,
    },
    /// Any command without a reply.
    Command(ConsoleCommand),
    /// Print the current state.
    Status,
    /// Print the command list.
    Help,
    /// Leave.
    Quit,
}

/// Fire-and-forget commands, mirroring [`SessionCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Click a building.
    Click(BuildingId),
    /// Clear the selection.
    Deselect,
    /// Send half of a garrison.
    Send(BuildingId, BuildingId),
    /// Upgrade a building.
    Upgrade(BuildingId),
    /// Pause or resume.
    Pause(bool),
    /// Playtime gate.
    Gate(bool),
    /// Restart.
    Restart,
}

impl From<ConsoleCommand> for SessionCommand {
    fn from(command: ConsoleCommand) -> Self {
        match command {
            ConsoleCommand::Click(id) => Self::Click(id),
            ConsoleCommand::Deselect => Self::Deselect,
            ConsoleCommand::Send(source, target) => Self::Send { source, target },
            ConsoleCommand::Upgrade(id) => Self::Upgrade(id),
            ConsoleCommand::Pause(paused) => Self::Pause(paused),
            ConsoleCommand::Gate(active) => Self::PlaytimeGate(active),
            ConsoleCommand::Restart => Self::Restart,
        }
    }
}

/// Why a line was not understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Blank line.
    #[error("Empty command")]
    Empty,
    /// Unknown verb.
    #[error("Unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    /// Wrong number of arguments.
    #[error("Usage: {0}")]
    Usage(&'static str),
    /// Unknown element name.
    #[error("Unknown element '{0}' (water, earth, air, fire)")]
    UnknownElement(String),
}

/// Command summary printed by `help`.
pub const HELP: &str = "\
setup <name> <element>   start the game (element: water, earth, air, fire)
click <id>               click a building
send <from> <to>         send half of a garrison
upgrade <id>             upgrade a building
deselect                 clear the selection
pause | resume           suspend or resume the clocks
gate on|off              toggle the playtime gate
restart                  restart with the same player
status                   show the map
quit                     leave";

/// Parse one console line.
pub fn parse(line: &str) -> Result<ConsoleInput, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Err(ParseError::Empty);
    };

    let id = |s: &str| BuildingId::from(s);
    let command = match (verb.to_ascii_lowercase().as_str(), args) {
        ("setup", [name, element]) => {
            return Ok(ConsoleInput::Setup {
                name: (*name).to_owned(),
                element: parse_element(*element)?,
            })
        }
        ("setup", _) => return Err(ParseError::Usage("setup <name> <element>")),
        ("click", [target]) => ConsoleCommand::Click(id(*target)),
        ("click", _) => return Err(ParseError::Usage("click <id>")),
        ("send", [source, target]) => ConsoleCommand::Send(id(*source), id(*target)),
        ("send", _) => return Err(ParseError::Usage("send <from> <to>")),
        ("upgrade", [target]) => ConsoleCommand::Upgrade(id(*target)),
        ("upgrade", _) => return Err(ParseError::Usage("upgrade <id>")),
        ("gate", ["on"]) => ConsoleCommand::Gate(true),
        ("gate", ["off"]) => ConsoleCommand::Gate(false),
        ("gate", _) => return Err(ParseError::Usage("gate on|off")),
        ("deselect", []) => ConsoleCommand::Deselect,
        ("pause", []) => ConsoleCommand::Pause(true),
        ("resume", []) => ConsoleCommand::Pause(false),
        ("restart", []) => ConsoleCommand::Restart,
        ("status", []) => return Ok(ConsoleInput::Status),
        ("help", []) => return Ok(ConsoleInput::Help),
        ("quit" | "exit", []) => return Ok(ConsoleInput::Quit),
        (other, _) => return Err(ParseError::UnknownCommand(other.to_owned())),
    };
    Ok(ConsoleInput::Command(command))
}

fn parse_element(word: &str) -> Result<Element, ParseError> {
    match word.to_ascii_lowercase().as_str() {
        "water" => Ok(Element::Water),
        "earth" => Ok(Element::Earth),
        "air" => Ok(Element::Air),
        "fire" => Ok(Element::Fire),
        _ => Err(ParseError::UnknownElement(word.to_owned())),
    }
}

/// Render a snapshot as a plain-text table.
#[must_use]
pub fn render(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "[{:?}] t={}s  player {} / enemy {}{}\n",
        snapshot.phase,
        snapshot.elapsed_ms / 1_000,
        snapshot.player_building_count,
        snapshot.enemy_building_count,
        if snapshot.paused { "  (paused)" } else { "" },
    ));
    for building in &snapshot.buildings {
        let marker = if snapshot.selected_building_id.as_ref() == Some(&building.id) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{marker}{:<4} {:<8} {:>3}/{:<3} L{}\n",
            building.id.as_str(),
            format!("{:?}", building.owner),
            building.units,
            building.max_units,
            building.level,
        ));
    }
    for transfer in &snapshot.transfers {
        out.push_str(&format!(
            "  {} -> {}: {} {:?} units\n",
            transfer.source, transfer.target, transfer.units, transfer.owner
        ));
    }
    if let Some(message) = &snapshot.message {
        out.push_str(&message.render());
        out.push('\n');
    }
    if let Some(banner) = &snapshot.game_over_message {
        out.push_str(banner);
        out.push('\n');
    }
    out
}
