use std::time::Duration;

/// Keeps ticks at a target rate. Late ticks are never caught up on.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    period: Duration,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// How long to sleep after a tick that took `work`, `None` when it ran over budget.
    #[inline]
    pub fn sleep_for(&self, work: Duration) -> Option<Duration> {
        self.period.checked_sub(work).filter(|d| !d.is_zero())
    }
}

/// Turns elapsed tick time into whole trained seconds, carrying the remainder over.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrainedClock {
    carry: Duration,
}

impl TrainedClock {
    /// Adds `elapsed` and returns how many whole seconds completed.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        self.carry += elapsed;
        let secs = self.carry.as_secs();
        self.carry -= Duration::from_secs(secs);
        secs
    }
}

/// Counts ticks and reports the count once per elapsed second.
#[derive(Debug, Default, Clone, Copy)]
pub struct RateMeter {
    window: Duration,
    ticks: u32,
}

impl RateMeter {
    /// Records one tick that followed the previous one by `elapsed`.
    ///
    /// # Returns
    /// The number of ticks of the window that just closed, if one closed.
    pub fn tick(&mut self, elapsed: Duration) -> Option<u32> {
        self.window += elapsed;
        self.ticks += 1;

        if self.window < Duration::from_secs(1) {
            return None;
        }

        let rate = self.ticks;
        *self = Self::default();
        Some(rate)
    }
}
