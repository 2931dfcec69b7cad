//! Periodic clocks.
//!
//! Every periodic behaviour of the game is a [`Clock`] with its own period.
//! Hosts decide how clocks are driven: the runtime gives each one a tokio
//! interval, while [`ClockSchedule`] fires them in virtual time for tests
//! and headless runs.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// One periodic behaviour.
///
/// Declaration order breaks ties between clocks due at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Clock {
    /// Owned-building unit production.
    Production,
    /// AI decision tick.
    AiDecision,
    /// Slow neutral regeneration.
    NeutralRegen,
    /// Neutral self-upgrade check.
    NeutralUpgrade,
    /// Neutral mutual-aid check.
    NeutralAid,
    /// Neutral chatter check.
    NeutralChatter,
    /// Transit resolution, message expiry and grace window.
    Frame,
}

impl Clock {
    /// Every clock, in tie-break order.
    pub const ALL: [Self; 7] = [
        Self::Production,
        Self::AiDecision,
        Self::NeutralRegen,
        Self::NeutralUpgrade,
        Self::NeutralAid,
        Self::NeutralChatter,
        Self::Frame,
    ];

    /// Period of this clock under `config`.
    #[must_use]
    pub const fn period_ms(self, config: &GameConfig) -> u64 {
        match self {
            Self::Production => config.unit_generation_interval_ms,
            Self::AiDecision => config.ai_action_interval_ms,
            Self::NeutralRegen => config.neutral_regen_interval_ms,
            Self::NeutralUpgrade => config.neutral_upgrade_interval_ms,
            Self::NeutralAid => config.neutral_aid_interval_ms,
            Self::NeutralChatter => config.neutral_chatter_interval_ms,
            Self::Frame => config.frame_interval_ms,
        }
    }
}

/// Next due time of every clock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockSchedule {
    periods: [u64; 7],
    due: [u64; 7],
}

impl ClockSchedule {
    /// Schedule every clock one period after `start_ms`.
    #[must_use]
    pub fn new(config: &GameConfig, start_ms: u64) -> Self {
        let periods = Clock::ALL.map(|clock| clock.period_ms(config).max(1));
        let mut schedule = Self {
            periods,
            due: [0; 7],
        };
        schedule.reset(start_ms);
        schedule
    }

    /// Restart every clock's phase from `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        for (due, period) in self.due.iter_mut().zip(self.periods) {
            *due = now_ms + period;
        }
    }

    /// The earliest due clock, ties broken by clock order.
    #[must_use]
    pub fn peek(&self) -> (u64, Clock) {
        Clock::ALL
            .into_iter()
            .map(|clock| (self.due[clock as usize], clock))
            .min()
            .unwrap_or((u64::MAX, Clock::Frame))
    }

    /// Pop the earliest clock if it is due at or before `until_ms`, and
    /// schedule its next firing.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(u64, Clock)> {
        let (due, clock) = self.peek();
        if due > until_ms {
            return None;
        }
        self.due[clock as usize] = due + self.periods[clock as usize];
        Some((due, clock))
    }

    /// When `clock` fires next.
    #[must_use]
    pub fn next_due(&self, clock: Clock) -> u64 {
        self.due[clock as usize]
    }
}
