use std::time::Duration;

/// Fixed pause between rows so outbound lookups stay at a courteous rate.
///
/// The pause is unconditional: it runs after every row, whatever that row's outcome.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn pause(&self) {
        if self.interval.is_zero() {
            return;
        }
        tokio::time::sleep(self.interval).await;
    }
}
