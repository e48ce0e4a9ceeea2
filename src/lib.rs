//! In-memory item service.
//!
//! A small HTTP service exposing CRUD operations over an in-memory
//! collection of items, plus a liveness endpoint:
//!
//! ```text
//! GET            /ping                  liveness
//! GET            /items/[?filter=name]  list items
//! POST           /items/                create item
//! GET|PUT|DELETE /items/{id}            read, replace, delete
//! POST           /items/{id}/duplicate  copy an item
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`items`]: Item types and the in-memory store
//! - [`api`]: Routing, request decoding, handlers and JSON responses
//! - [`server`]: Listener lifecycle and graceful drain
//! - [`metrics`]: Prometheus counters and histograms
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod items;
pub mod metrics;
pub mod server;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
