//! Typed route helpers
//!
//! Thin wrappers that issue requests through a surface's queue and decode
//! the platform's entities.

mod api;
mod media;

pub use api::{ApiClient, MemberList, SendMessage};
pub use media::{MediaClient, MediaInfo};
