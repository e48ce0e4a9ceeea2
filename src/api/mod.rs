//! HTTP API: routing, request decoding, handlers and JSON responses.

pub mod extract;
pub mod handlers;
pub mod response;
pub mod routes;

pub use handlers::AppState;
pub use response::ApiError;
pub use routes::{create_router, router_with_timeout};
