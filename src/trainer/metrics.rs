/// Counters of a single session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoopMetrics {
    pub ticks: u64,
    /// Ticks that ran a backward pass.
    pub trained: u64,
    /// Ticks dropped because a sample, reward or update failed.
    pub skipped: u64,
    pub rewards: u64,
    pub checkpoints: u64,
}

impl LoopMetrics {
    #[inline]
    pub fn bump_tick(&mut self) {
        self.ticks += 1;
    }

    #[inline]
    pub fn bump_trained(&mut self) {
        self.trained += 1;
    }

    #[inline]
    pub fn bump_skipped(&mut self) {
        self.skipped += 1;
    }

    #[inline]
    pub fn bump_reward(&mut self) {
        self.rewards += 1;
    }

    #[inline]
    pub fn bump_checkpoint(&mut self) {
        self.checkpoints += 1;
    }
}
