//! # Mastil Runtime
//!
//! Real-time host for one game.
//!
//! A single tokio task owns the [`Game`](mastil_core::game::Game) and drives
//! every clock from its own interval, serialising timers and player commands
//! through one `select!` loop. Renderers read [`GameSnapshot`]s from a
//! `watch` channel.
//!
//! [`GameSnapshot`]: mastil_core::snapshot::GameSnapshot

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod audio;
pub mod console;
pub mod session;
pub mod timers;

use std::path::{Path, PathBuf};

use mastil_core::config::GameConfig;
use mastil_core::data::Layout;
use mastil_core::error::GameError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while starting or running a session.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A data file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Game data or setup was rejected.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The session task is gone.
    #[error("Session has stopped")]
    SessionClosed,
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Game rules and clock periods.
    pub game: GameConfig,
    /// RNG seed; derived from the wall clock when absent.
    pub seed: Option<u64>,
    /// RON layout file; the standard map when absent.
    pub layout_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Parse from RON text and validate the game config.
    pub fn from_ron(source: &str, origin: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: origin.to_owned(),
            message: e.to_string(),
        })?;
        config.game.validate()?;
        Ok(config)
    }

    /// Load from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = read(path)?;
        Self::from_ron(&source, &path.display().to_string())
    }

    /// The layout to play: the configured file, or the standard map.
    pub fn load_layout(&self) -> Result<Layout> {
        let Some(path) = &self.layout_path else {
            return Ok(Layout::standard());
        };
        let source = read(path)?;
        let layout = Layout::from_ron(&source, &path.display().to_string())?;
        layout.validate(&self.game)?;
        Ok(layout)
    }

    /// The configured seed, or one taken from the wall clock.
    #[must_use]
    pub fn seed_or_now(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_secs())
        })
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
        path: path.to_owned(),
        source,
    })
}
