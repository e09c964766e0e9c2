//! Entity storage module.
//!
//! A generic concurrent keyed store plus the aggregate cache of every entity
//! kind the client tracks.

mod entity_cache;
mod entity_store;

pub use entity_cache::{EntityCache, SharedEntityCache};
pub use entity_store::EntityStore;
