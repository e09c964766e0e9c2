//! Time source abstraction
//!
//! Heartbeats, reconnect delays and request retries all wait through a
//! [`Clock`] so tests can drive time deterministically.

mod tokio_clock;

pub use tokio_clock::TokioClock;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A monotonic clock with an async timer
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> u64;

    /// Wait for the given duration
    async fn sleep(&self, duration: Duration);

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Default clock backed by the tokio timer
pub fn system_clock() -> SharedClock {
    Arc::new(TokioClock::new())
}
