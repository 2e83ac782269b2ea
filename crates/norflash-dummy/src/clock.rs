//! Simulated monotonic clock

use norflash_core::bus::Clock;

/// Monotonic clock that only moves when asked
///
/// Every `now_us()` call returns the current time and then advances it by
/// `step_us`, so a polling loop sees time pass without any real delay.
/// `delay_us()` advances by exactly the requested amount.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: u64,
    step: u64,
    delayed: u64,
}

impl MockClock {
    /// A clock that stands still unless delayed
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that advances `step_us` on every read
    pub fn with_step(step_us: u64) -> Self {
        Self {
            step: step_us,
            ..Self::default()
        }
    }

    /// Current time without advancing
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Total time spent in `delay_us`
    pub fn total_delay(&self) -> u64 {
        self.delayed
    }

    /// Move time forward
    pub fn advance(&mut self, us: u64) {
        self.now += us;
    }
}

impl Clock for MockClock {
    fn now_us(&mut self) -> u64 {
        let now = self.now;
        self.now += self.step;
        now
    }

    fn delay_us(&mut self, us: u32) {
        self.now += u64::from(us);
        self.delayed += u64::from(us);
    }
}
