//! Single match runner.

use mastil_core::building::Element;
use mastil_core::clock::Clock;
use mastil_core::config::GameConfig;
use mastil_core::data::Layout;
use mastil_core::simulation::Simulation;

use crate::bot::{Bot, BotKind};
use crate::metrics::{MatchReport, MetricsCollector};
use crate::Result;

/// Name the bot plays under.
pub const BOT_NAME: &str = "Bot";

/// Everything needed to run one match.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// RNG seed.
    pub seed: u64,
    /// Virtual time limit in minutes.
    pub minutes: u64,
    /// Player bot.
    pub bot: BotKind,
    /// Bot thinking interval in virtual milliseconds.
    pub bot_interval_ms: u64,
    /// Game rules.
    pub game: GameConfig,
    /// Map.
    pub layout: Layout,
    /// Keep the final snapshot in the report.
    pub include_snapshot: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            minutes: 15,
            bot: BotKind::Passive,
            bot_interval_ms: 2_000,
            game: GameConfig::default(),
            layout: Layout::standard(),
            include_snapshot: false,
        }
    }
}

impl MatchConfig {
    /// Virtual time limit in milliseconds.
    #[must_use]
    pub const fn limit_ms(&self) -> u64 {
        self.minutes.saturating_mul(60_000)
    }
}

/// Run one match to its end or time limit.
pub fn run_match(config: &MatchConfig) -> Result<MatchReport> {
    let mut sim = Simulation::new(config.game.clone(), config.layout.clone(), config.seed)?;
    sim.setup(BOT_NAME, Element::Earth)?;

    let bot = Bot::new(config.bot);
    let limit = config.limit_ms();
    let step = config.bot_interval_ms.max(1);
    let mut metrics = MetricsCollector::new();
    metrics.record(sim.now_ms(), sim.drain_events());

    while sim.now_ms() < limit && !sim.game().is_over() {
        let next = sim.now_ms().saturating_add(step).min(limit);
        advance_recording(&mut sim, &mut metrics, next);
        if sim.game().is_over() {
            break;
        }
        bot.act(&mut sim);
        metrics.record(sim.now_ms(), sim.drain_events());
    }

    let snapshot = sim.snapshot();
    tracing::info!(
        seed = config.seed,
        outcome = ?snapshot.phase,
        elapsed_ms = snapshot.elapsed_ms,
        "match finished"
    );
    Ok(metrics.finish(
        config.seed,
        config.bot,
        snapshot,
        sim.state_hash(),
        config.include_snapshot,
    ))
}

/// Advance clock by clock so every event is stamped with the time it
/// happened.
fn advance_recording(sim: &mut Simulation, metrics: &mut MetricsCollector, target_ms: u64) {
    loop {
        let due = Clock::ALL
            .into_iter()
            .map(|clock| sim.next_due(clock))
            .min()
            .unwrap_or(target_ms);
        if due > target_ms {
            sim.advance_to(target_ms);
            metrics.record(sim.now_ms(), sim.drain_events());
            return;
        }
        sim.advance_to(due);
        metrics.record(sim.now_ms(), sim.drain_events());
        if sim.game().is_over() {
            return;
        }
    }
}
