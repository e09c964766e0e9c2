//! Heartbeat/keepalive mechanism.
//!
//! The client pings on a recurring timer and expects a `Pong` before the
//! next tick. A tick that finds the previous ping unacknowledged is a
//! liveness failure.

use chat_common::SharedClock;
use std::time::Duration;

use crate::timer::Timer;

/// Default interval between pings
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Result of starting a heartbeat round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The previous ping was answered (or none was sent yet)
    Alive,
    /// The previous ping was never answered
    PongMissed,
}

/// Heartbeat bookkeeping for the current socket
pub struct HeartbeatMonitor {
    clock: SharedClock,
    interval: Option<Duration>,
    timer: Timer,
    last_ping: Option<u64>,
    last_pong_ack: bool,
}

impl HeartbeatMonitor {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            interval: None,
            timer: Timer::new(),
            last_ping: None,
            last_pong_ack: true,
        }
    }

    /// Arm the recurring timer, clearing any existing one; `None` disarms
    pub fn set_timer(&mut self, interval: Option<Duration>) {
        self.clear();
        self.interval = interval;
        if let Some(interval) = interval {
            self.timer.arm(&self.clock, interval);
        }
    }

    /// Disarm heartbeating
    pub fn clear(&mut self) {
        self.timer.clear();
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Resolve on the next tick and re-arm for the following one
    pub async fn tick(&mut self) {
        self.timer.expired().await;
        if let Some(interval) = self.interval {
            self.timer.arm(&self.clock, interval);
        }
    }

    /// Forget ping state for a fresh socket
    pub fn reset(&mut self) {
        self.last_ping = None;
        self.last_pong_ack = true;
    }

    /// Record an outgoing ping, returning its timestamp and the liveness verdict
    pub fn record_ping(&mut self) -> (u64, Liveness) {
        let liveness = if self.last_pong_ack {
            Liveness::Alive
        } else {
            Liveness::PongMissed
        };

        let now = self.clock.now_millis();
        self.last_pong_ack = false;
        self.last_ping = Some(now);
        (now, liveness)
    }

    /// Check the previous ping without recording a new one
    pub fn liveness(&self) -> Liveness {
        if self.last_pong_ack {
            Liveness::Alive
        } else {
            Liveness::PongMissed
        }
    }

    /// Mark the last ping as answered
    pub fn ack(&mut self) {
        self.last_pong_ack = true;
    }

    pub fn is_acked(&self) -> bool {
        self.last_pong_ack
    }

    pub fn last_ping(&self) -> Option<u64> {
        self.last_ping
    }
}

impl std::fmt::Debug for HeartbeatMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatMonitor")
            .field("clock", &self.clock.name())
            .field("interval", &self.interval)
            .field("timer", &self.timer)
            .field("last_ping", &self.last_ping)
            .field("last_pong_ack", &self.last_pong_ack)
            .finish()
    }
}
