//! Item records and the in-memory store that owns them.
//!
//! This module handles:
//! - The `Item` wire type and the create/update payload
//! - The `ItemRepository` contract handlers program against
//! - `MemoryStore`, the lock-guarded in-memory implementation

pub mod store;
pub mod types;

pub use store::{ItemRepository, MemoryStore};
pub use types::{Item, ItemId, NewItem};
