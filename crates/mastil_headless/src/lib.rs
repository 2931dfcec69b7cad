//! Headless match runner for balance checks and CI verification.
//!
//! Matches run in virtual time through
//! [`Simulation`](mastil_core::simulation::Simulation), with a scripted bot
//! standing in for the player. This enables:
//!
//! - **Balance checks**: how often each AI strategy beats a given bot
//! - **CI verification**: the same seed always produces the same report
//! - **Data validation**: layout and config files are checked before play
//!
//! # Example
//!
//! ```bash
//! # One match, JSON report on stdout
//! cargo run -p mastil_headless -- run --seed 7 --minutes 15 --bot expander
//!
//! # A hundred matches in parallel
//! cargo run -p mastil_headless -- batch --count 100 --seed 0
//!
//! # Check data files
//! cargo run -p mastil_headless -- validate --layout map.ron --config rules.ron
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod bot;
pub mod metrics;
pub mod runner;
pub mod validate;

use std::path::PathBuf;

use mastil_core::error::GameError;
use thiserror::Error;

pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use bot::{Bot, BotKind};
pub use metrics::{MatchReport, MetricsCollector};
pub use runner::{run_match, MatchConfig};
pub use validate::{load_data, validate_files, ValidationReport};

/// Errors raised by the headless runner.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// A file could not be read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Game data was rejected.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A report could not be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for headless operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;
