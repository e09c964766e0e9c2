//! Integration test utilities for the chat client
//!
//! This crate provides scripted transports, mock sockets and local servers
//! for end-to-end tests of the request queues and the gateway connection.

pub mod fixtures;

pub use fixtures::*;
pub use helpers::*;
