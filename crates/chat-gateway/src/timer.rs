//! One-shot timer driven by the injected clock.
//!
//! The driver polls a timer from inside `tokio::select!`; dropping the
//! `expired()` future leaves the timer armed.

use chat_common::SharedClock;
use futures::future::BoxFuture;
use std::time::Duration;

/// A single pending deadline
#[derive(Default)]
pub struct Timer {
    deadline: Option<BoxFuture<'static, ()>>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer, replacing any pending deadline
    pub fn arm(&mut self, clock: &SharedClock, after: Duration) {
        let clock = clock.clone();
        self.deadline = Some(Box::pin(async move { clock.sleep(after).await }));
    }

    /// Disarm the timer
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolve when the deadline passes; never resolves while disarmed
    ///
    /// The timer is disarmed once this returns.
    pub async fn expired(&mut self) {
        match self.deadline.as_mut() {
            Some(deadline) => {
                deadline.await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("armed", &self.is_armed())
            .finish()
    }
}
