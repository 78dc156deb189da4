use std::time::Duration;

use crate::error::ConfigError;

/// Fixed-period timer driven by elapsed wall time.
///
/// The caller feeds elapsed time through [`TickScheduler::advance`], runs
/// one full pass per returned tick, in sequence, and reports each finished
/// pass with [`TickScheduler::record_tick`]; a tick is never armed while
/// another is running.
#[derive(Clone, Debug)]
pub struct TickScheduler {
    interval: Duration,
    pending: Duration,
    completed: u64,
}

impl TickScheduler {
    /// ### Errors
    /// [`ConfigError::NonPositiveInterval`] if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::NonPositiveInterval);
        }
        Ok(Self {
            interval,
            pending: Duration::ZERO,
            completed: 0,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks whose pass ran to completion.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Time accumulated towards the next tick.
    pub fn pending(&self) -> Duration {
        self.pending
    }

    /// Accumulates `elapsed` and returns how many ticks became due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.pending += elapsed;
        let mut due = 0;
        while self.pending >= self.interval {
            self.pending -= self.interval;
            due += 1;
        }
        due
    }

    /// Counts one finished pass, whether it was due on the timer or run by
    /// hand.
    pub fn record_tick(&mut self) {
        self.completed += 1;
    }

    /// Drops accumulated time, e.g. after a pause.
    pub fn reset_phase(&mut self) {
        self.pending = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_is_rejected() {
        assert!(matches!(
            TickScheduler::new(Duration::ZERO),
            Err(ConfigError::NonPositiveInterval)
        ));
    }

    #[test]
    fn fires_once_per_full_interval() {
        let mut s = TickScheduler::new(Duration::from_millis(1000)).unwrap();

        assert_eq!(s.advance(Duration::from_millis(400)), 0);
        assert_eq!(s.advance(Duration::from_millis(400)), 0);
        assert_eq!(s.advance(Duration::from_millis(400)), 1);
        assert_eq!(s.pending(), Duration::from_millis(200));

        assert_eq!(s.advance(Duration::from_millis(2900)), 3);
        assert_eq!(s.pending(), Duration::from_millis(100));
        // Due ticks are not completed ticks.
        assert_eq!(s.completed(), 0);
    }

    #[test]
    fn record_tick_and_reset_phase() {
        let mut s = TickScheduler::new(Duration::from_millis(100)).unwrap();
        s.advance(Duration::from_millis(50));
        s.record_tick();
        assert_eq!(s.completed(), 1);
        assert_eq!(s.pending(), Duration::from_millis(50));

        s.reset_phase();
        assert_eq!(s.advance(Duration::from_millis(99)), 0);
        assert_eq!(s.advance(Duration::from_millis(1)), 1);
    }
}
