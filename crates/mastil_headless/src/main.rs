//! Headless Mastil match runner.
//!
//! Plays matches in virtual time with a scripted bot on the player side.
//! Designed for balance checks, CI and determinism verification.
//!
//! # Usage
//!
//! ```bash
//! # Play one match and print its report
//! cargo run -p mastil_headless -- run --seed 7 --bot expander
//!
//! # Run a batch in parallel and save the results
//! cargo run -p mastil_headless -- batch --count 500 --output results/batch.json
//!
//! # Check data files
//! cargo run -p mastil_headless -- validate --layout maps/duel.ron
//!
//! # Verify a seed replays identically
//! cargo run -p mastil_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! Reports are written to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mastil_headless::{
    load_data, run_batch, run_match, validate_files, BatchConfig, BotKind, HeadlessError,
    MatchConfig,
};

#[derive(Parser)]
#[command(name = "mastil_headless")]
#[command(about = "Headless Mastil match runner for balance checks and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Game config file (RON); defaults to built-in rules
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Layout file (RON); defaults to the standard map
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match
    Run {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Time limit in virtual minutes
        #[arg(long, default_value = "15")]
        minutes: u64,

        /// Bot playing the player side
        #[arg(long, value_enum, default_value = "expander")]
        bot: BotKind,

        /// Include the final snapshot in the report
        #[arg(long)]
        snapshot: bool,
    },

    /// Run a batch of matches in parallel
    Batch {
        /// Number of matches
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Seed of the first match
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Time limit per match in virtual minutes
        #[arg(long, default_value = "15")]
        minutes: u64,

        /// Bot playing the player side
        #[arg(long, value_enum, default_value = "expander")]
        bot: BotKind,

        /// Save full results to this JSON file; only the summary is printed
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate layout and config files
    Validate,

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Time limit per run in virtual minutes
        #[arg(long, default_value = "10")]
        minutes: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON output. RUST_LOG wins
    // over --verbose when set.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(%err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, HeadlessError> {
    let Cli {
        config,
        layout,
        command,
        ..
    } = cli;
    let (layout_path, config_path) = (layout.as_deref(), config.as_deref());

    match command {
        Commands::Validate => cmd_validate(layout_path, config_path),
        Commands::Run {
            seed,
            minutes,
            bot,
            snapshot,
        } => {
            let (game, layout) = load_data(layout_path, config_path)?;
            cmd_run(&MatchConfig {
                seed,
                minutes,
                bot,
                game,
                layout,
                include_snapshot: snapshot,
                ..MatchConfig::default()
            })
        }
        Commands::Batch {
            count,
            seed,
            minutes,
            bot,
            output,
        } => {
            let (game, layout) = load_data(layout_path, config_path)?;
            let config = BatchConfig {
                count,
                seed_start: seed,
                minutes,
                bot,
                game,
                layout,
            };
            cmd_batch(&config, output.as_deref())
        }
        Commands::Verify {
            seed,
            runs,
            minutes,
        } => {
            let (game, layout) = load_data(layout_path, config_path)?;
            cmd_verify(
                &MatchConfig {
                    seed,
                    minutes,
                    bot: BotKind::Expander,
                    game,
                    layout,
                    ..MatchConfig::default()
                },
                runs,
            )
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), HeadlessError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Play one match
fn cmd_run(config: &MatchConfig) -> Result<ExitCode, HeadlessError> {
    tracing::info!(seed = config.seed, bot = ?config.bot, "Starting match");
    let report = run_match(config)?;
    print_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Run a batch of matches
fn cmd_batch(config: &BatchConfig, output: Option<&Path>) -> Result<ExitCode, HeadlessError> {
    let results = run_batch(config);

    tracing::info!(
        matches = results.summary.matches,
        errors = results.errors.len(),
        win_rate = %format!("{:.1}%", results.summary.player_win_rate() * 100.0),
        duration_secs = %format!("{:.1}", results.duration_seconds),
        "Batch complete"
    );

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| HeadlessError::Io {
                    path: parent.to_owned(),
                    source,
                })?;
            }
            results.save(path)?;
            tracing::info!(path = %path.display(), "Results saved");
            print_json(&results.summary)?;
        }
        None => print_json(&results)?,
    }

    Ok(if results.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Validate data files
fn cmd_validate(layout: Option<&Path>, config: Option<&Path>) -> Result<ExitCode, HeadlessError> {
    let report = validate_files(layout, config)?;
    tracing::info!(buildings = report.buildings, "Data files valid");
    print_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Run the same seed several times and compare state hashes
fn cmd_verify(config: &MatchConfig, runs: u32) -> Result<ExitCode, HeadlessError> {
    tracing::info!(seed = config.seed, runs, "Verifying determinism");

    let mut hashes = Vec::with_capacity(runs as usize);
    for run in 0..runs {
        let report = run_match(config)?;
        tracing::debug!(run, hash = %format!("{:016x}", report.state_hash), "Run complete");
        hashes.push(report.state_hash);
    }

    let deterministic = hashes.windows(2).all(|pair| pair[0] == pair[1]);
    if deterministic {
        tracing::info!(seed = config.seed, "Determinism verified");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!(seed = config.seed, ?hashes, "Determinism check FAILED");
        Ok(ExitCode::FAILURE)
    }
}
