//! Clock backed by `tokio::time`

use super::Clock;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::time::Instant;

/// Clock anchored to wall time at creation and advanced by the tokio timer
///
/// Under a paused tokio runtime both `now_millis` and `sleep` follow the
/// virtual time, which keeps ping timestamps consistent with timer expiry.
#[derive(Debug, Clone)]
pub struct TokioClock {
    epoch_millis: u64,
    started: Instant,
}

impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch_millis: Utc::now().timestamp_millis().max(0) as u64,
            started: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now_millis(&self) -> u64 {
        self.epoch_millis + self.started.elapsed().as_millis() as u64
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn name(&self) -> &str {
        "TokioClock"
    }
}
