//! Client events
//!
//! Typed events published after each inbound packet is applied.

mod bus;
mod client_event;

pub use bus::EventBus;
pub use client_event::ClientEvent;
