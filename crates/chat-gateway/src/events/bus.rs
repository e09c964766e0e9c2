//! Event bus
//!
//! Broadcasts client events to every subscriber in dispatch order.
//!
//! Each subscriber has a bounded buffer. A subscriber that falls more than
//! the buffer size behind loses the oldest events and its next `recv`
//! returns `RecvError::Lagged(n)` with the number skipped. Later events
//! still arrive in order.

use tokio::sync::broadcast;

use super::ClientEvent;

/// Default number of events buffered per subscriber
const EVENT_BUFFER_SIZE: usize = 1024;

/// Fan-out of client events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            capacity: capacity.next_power_of_two(),
        }
    }

    /// Subscribe to events published from now on
    ///
    /// The receiver must keep up. Once it is `capacity` events behind, the
    /// oldest unread events are overwritten and the next `recv` reports
    /// `RecvError::Lagged` instead of returning them.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; events with no subscribers are dropped
    pub fn emit(&self, event: ClientEvent) {
        let name = event.name();
        if self.tx.len() >= self.capacity {
            tracing::warn!(
                event = name,
                capacity = self.capacity,
                "Event subscriber lagging, oldest event overwritten"
            );
        }
        if self.tx.send(event).is_err() {
            tracing::trace!(event = name, "No subscribers for event");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
