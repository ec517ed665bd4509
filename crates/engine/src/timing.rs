use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PollTiming {
    /// Gap between two cookie reads; the first read happens one interval after the click.
    pub interval: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
        }
    }
}

impl PollTiming {
    pub fn with_interval(mut self, ms: u64) -> Self {
        self.interval = Duration::from_millis(ms);
        self
    }
}
