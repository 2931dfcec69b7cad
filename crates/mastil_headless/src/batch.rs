//! Batch match runner.
//!
//! Runs many seeds in parallel using rayon and aggregates the reports.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use mastil_core::config::GameConfig;
use mastil_core::data::Layout;
use mastil_core::events::GameOutcome;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bot::BotKind;
use crate::metrics::MatchReport;
use crate::runner::{run_match, MatchConfig};
use crate::HeadlessError;

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of matches.
    pub count: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Virtual time limit per match, in minutes.
    pub minutes: u64,
    /// Player bot.
    pub bot: BotKind,
    /// Game rules.
    pub game: GameConfig,
    /// Map.
    pub layout: Layout,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 100,
            seed_start: 0,
            minutes: 15,
            bot: BotKind::Expander,
            game: GameConfig::default(),
            layout: Layout::standard(),
        }
    }
}

impl BatchConfig {
    fn match_config(&self, seed: u64) -> MatchConfig {
        MatchConfig {
            seed,
            minutes: self.minutes,
            bot: self.bot,
            game: self.game.clone(),
            layout: self.layout.clone(),
            ..MatchConfig::default()
        }
    }
}

/// A match that could not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches that ran.
    pub matches: u32,
    /// Matches the player bot won.
    pub player_wins: u32,
    /// Matches the AI won.
    pub enemy_wins: u32,
    /// Matches stopped by the time limit.
    pub unfinished: u32,
    /// Mean virtual duration of finished matches, in seconds.
    pub avg_finished_secs: f64,
    /// Mean strategy switches per match.
    pub avg_strategy_switches: f64,
    /// AI wins keyed by opening strategy name.
    pub enemy_wins_by_opening: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Aggregate `reports`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_reports(reports: &[MatchReport]) -> Self {
        let mut summary = Self {
            matches: u32::try_from(reports.len()).unwrap_or(u32::MAX),
            ..Self::default()
        };
        let mut finished_ms = 0u64;
        let mut switches = 0usize;

        for report in reports {
            switches += report.strategy_history.len();
            match report.outcome {
                Some(GameOutcome::Victory) => summary.player_wins += 1,
                Some(GameOutcome::Defeat) => {
                    summary.enemy_wins += 1;
                    if let Some(opening) = report.opening_strategy {
                        *summary
                            .enemy_wins_by_opening
                            .entry(opening.name().to_owned())
                            .or_insert(0) += 1;
                    }
                }
                None => summary.unfinished += 1,
            }
            if report.outcome.is_some() {
                finished_ms += report.duration_ms;
            }
        }

        let finished = summary.player_wins + summary.enemy_wins;
        if finished > 0 {
            summary.avg_finished_secs = finished_ms as f64 / 1_000.0 / f64::from(finished);
        }
        if !reports.is_empty() {
            summary.avg_strategy_switches = switches as f64 / reports.len() as f64;
        }
        summary
    }

    /// Share of all matches the player bot won.
    #[must_use]
    pub fn player_win_rate(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        f64::from(self.player_wins) / f64::from(self.matches)
    }
}

/// Results of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Per-match reports, in seed order.
    pub reports: Vec<MatchReport>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Matches that failed to start.
    pub errors: Vec<BatchError>,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results as pretty JSON.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| HeadlessError::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Load results saved by [`BatchResults::save`].
    pub fn load(path: &Path) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| HeadlessError::Io {
            path: path.to_owned(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Run a batch of matches in parallel.
#[must_use]
pub fn run_batch(config: &BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        count = config.count,
        seed_start = config.seed_start,
        bot = ?config.bot,
        "starting batch"
    );

    let outcomes: Vec<(u64, crate::Result<MatchReport>)> = (0..config.count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            (seed, run_match(&config.match_config(seed)))
        })
        .collect();

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for (seed, outcome) in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(err) => {
                warn!(seed, %err, "match failed");
                errors.push(BatchError {
                    seed,
                    message: err.to_string(),
                });
            }
        }
    }

    let summary = BatchSummary::from_reports(&reports);
    info!(
        matches = summary.matches,
        player_wins = summary.player_wins,
        enemy_wins = summary.enemy_wins,
        "batch finished"
    );

    BatchResults {
        reports,
        summary,
        errors,
        duration_seconds: start.elapsed().as_secs_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_reports(&[]);
        assert_eq!(summary.matches, 0);
        assert!((summary.player_win_rate() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_batch_runs_every_seed_in_order() {
        let config = BatchConfig {
            count: 4,
            seed_start: 10,
            minutes: 1,
            ..BatchConfig::default()
        };
        let results = run_batch(&config);

        assert!(results.errors.is_empty());
        let seeds: Vec<u64> = results.reports.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12, 13]);
        assert_eq!(results.summary.matches, 4);
        assert_eq!(
            results.summary.player_wins + results.summary.enemy_wins + results.summary.unfinished,
            4
        );
    }

    #[test]
    fn test_parallel_batch_matches_sequential_runs() {
        let config = BatchConfig {
            count: 3,
            seed_start: 5,
            minutes: 2,
            ..BatchConfig::default()
        };
        let results = run_batch(&config);
        for report in &results.reports {
            let single = run_match(&config.match_config(report.seed)).unwrap();
            assert_eq!(&single, report);
        }
    }

    #[test]
    fn test_invalid_layout_collected_as_errors() {
        let config = BatchConfig {
            count: 2,
            minutes: 1,
            layout: Layout { buildings: vec![] },
            ..BatchConfig::default()
        };
        let results = run_batch(&config);

        assert!(results.reports.is_empty());
        assert_eq!(results.errors.len(), 2);
    }

    #[test]
    fn test_results_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        let results = run_batch(&BatchConfig {
            count: 1,
            minutes: 1,
            ..BatchConfig::default()
        });

        results.save(&path).unwrap();
        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.summary.matches, 1);
        assert_eq!(loaded.reports, results.reports);
    }
}
