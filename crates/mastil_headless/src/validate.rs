//! Data file validation.

use std::path::Path;

use mastil_core::building::Owner;
use mastil_core::config::GameConfig;
use mastil_core::data::Layout;
use mastil_core::economy::upgrade_cost;
use serde::Serialize;

use crate::{HeadlessError, Result};

/// Summary of a validated layout and config pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Buildings in the layout.
    pub buildings: usize,
    /// Neutral buildings in the layout.
    pub neutrals: usize,
    /// AI home base.
    pub home_base: Option<String>,
    /// Upgrade cost from each level, starting at level 1.
    pub upgrade_costs: Vec<u32>,
}

/// Load the given data files and check the layout against the config.
/// Absent paths fall back to the built-in rules and the standard map.
pub fn load_data(layout: Option<&Path>, config: Option<&Path>) -> Result<(GameConfig, Layout)> {
    let config = match config {
        Some(path) => GameConfig::from_ron(&read(path)?, &path.display().to_string())?,
        None => GameConfig::default(),
    };
    let layout = match layout {
        Some(path) => Layout::from_ron(&read(path)?, &path.display().to_string())?,
        None => Layout::standard(),
    };
    layout.validate(&config)?;
    Ok((config, layout))
}

/// Load and validate the given files, summarizing what they describe.
pub fn validate_files(layout: Option<&Path>, config: Option<&Path>) -> Result<ValidationReport> {
    let (config, layout) = load_data(layout, config)?;
    let upgrade_costs = (1..config.max_building_level)
        .map(|level| upgrade_cost(level, &config))
        .collect();

    Ok(ValidationReport {
        buildings: layout.buildings.len(),
        neutrals: layout
            .buildings
            .iter()
            .filter(|e| e.owner == Owner::Neutral)
            .count(),
        home_base: layout.home_base().map(|id| id.as_str().to_owned()),
        upgrade_costs,
    })
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| HeadlessError::Io {
        path: path.to_owned(),
        source,
    })
}
