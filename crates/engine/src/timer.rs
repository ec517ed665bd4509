use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Fixed-period repeating timer owned by one poll session.
///
/// `stop` consumes the timer, so it can only happen once.
pub struct PollTimer {
    interval: Interval,
}

impl PollTimer {
    pub fn start(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    pub fn stop(self) {}
}
