//! # chat-cache
//!
//! In-memory caching layer for entities received from the gateway and the API.
//!
//! ## Features
//!
//! - **Entity Stores**: Concurrent keyed stores with partial-update support
//! - **Member Index**: Per-server member lists and counts
//! - **Voice State**: Participants of every voice channel
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::EntityCache;
//!
//! let cache = EntityCache::shared();
//! cache.insert_user(user);
//!
//! // Apply an update packet's partial
//! cache.users().patch(&user_id, &data, &clear)?;
//! ```

pub mod store;

// Re-export store types
pub use store::{EntityCache, EntityStore, SharedEntityCache};
