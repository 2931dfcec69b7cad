//! One tokio interval per game clock.

use std::future::poll_fn;
use std::task::Poll;
use std::time::Duration;

use mastil_core::clock::Clock;
use mastil_core::config::GameConfig;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// The seven clock intervals of a session.
#[derive(Debug)]
pub struct ClockTimers {
    timers: Vec<(Clock, Interval)>,
    periods: Vec<(Clock, Duration)>,
}

impl ClockTimers {
    /// Start every clock so its first tick lands one period after `start`.
    #[must_use]
    pub fn new(config: &GameConfig, start: Instant) -> Self {
        let periods: Vec<(Clock, Duration)> = Clock::ALL
            .into_iter()
            .map(|clock| (clock, Duration::from_millis(clock.period_ms(config))))
            .collect();
        let timers = Self::build(&periods, start);
        Self { timers, periods }
    }

    /// Restart every clock from `now`, dropping any pending phase.
    pub fn reset(&mut self, now: Instant) {
        self.timers = Self::build(&self.periods, now);
    }

    /// Wait for the next clock tick. Clocks ready at the same poll are
    /// reported in declaration order.
    pub async fn tick(&mut self) -> Clock {
        poll_fn(|cx| {
            for (clock, interval) in &mut self.timers {
                if interval.poll_tick(cx).is_ready() {
                    return Poll::Ready(*clock);
                }
            }
            Poll::Pending
        })
        .await
    }

    fn build(periods: &[(Clock, Duration)], start: Instant) -> Vec<(Clock, Interval)> {
        periods
            .iter()
            .map(|&(clock, period)| {
                let mut interval = interval_at(start + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                (clock, interval)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_period() {
        let config = GameConfig::default();
        let start = Instant::now();
        let mut timers = ClockTimers::new(&config, start);

        assert_eq!(timers.tick().await, Clock::Frame);
        assert_eq!(start.elapsed(), Duration::from_millis(config.frame_interval_ms));
    }

    #[tokio::test(start_paused = true)]
    async fn test_production_ticks_every_second() {
        let config = GameConfig::default();
        let start = Instant::now();
        let mut timers = ClockTimers::new(&config, start);

        let mut production = 0;
        while start.elapsed() < Duration::from_millis(5_000) {
            if timers.tick().await == Clock::Production {
                production += 1;
            }
        }
        assert_eq!(production, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restarts_phase() {
        let config = GameConfig::default();
        let mut timers = ClockTimers::new(&config, Instant::now());
        tokio::time::advance(Duration::from_millis(900)).await;

        let restarted = Instant::now();
        timers.reset(restarted);
        loop {
            if timers.tick().await == Clock::Production {
                break;
            }
        }
        assert_eq!(restarted.elapsed(), Duration::from_millis(1_000));
    }
}
