//! Reconnection policy.
//!
//! Reconnects wait a constant delay and are bounded by a fixed attempt
//! ceiling; there is no exponential backoff.

use std::time::Duration;

use crate::error::{GatewayError, GatewayResult};

/// Delay before every reconnect attempt
pub const RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Attempts allowed before giving up
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: RECONNECT_DELAY,
            max_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// Counts connection attempts since the last successful authentication
#[derive(Debug, Clone)]
pub struct RetryBudget {
    attempts: u32,
    ceiling: u32,
}

impl RetryBudget {
    pub fn new(ceiling: u32) -> Self {
        Self { attempts: 0, ceiling }
    }

    /// Spend one attempt
    ///
    /// # Errors
    /// Returns [`GatewayError::MaxRetryExceeded`] once the ceiling is passed.
    pub fn spend(&mut self) -> GatewayResult<u32> {
        self.attempts += 1;
        if self.attempts > self.ceiling {
            return Err(GatewayError::MaxRetryExceeded {
                attempts: self.attempts - 1,
            });
        }
        Ok(self.attempts)
    }

    /// Start over after a successful authentication
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}
