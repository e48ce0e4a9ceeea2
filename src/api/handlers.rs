//! HTTP API handlers.
//!
//! Each handler decodes its input through the extractors, calls the store
//! and maps the outcome onto one of the fixed response shapes.

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::Uri,
    response::{IntoResponse, Response},
    BoxError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tower::timeout::error::Elapsed;

use super::extract::{JsonBody, PathId};
use super::response::{self, ApiError, MSG_NOT_FOUND, MSG_NO_ENDPOINT, MSG_REQUEST_TIMEOUT};
use crate::items::{ItemRepository, MemoryStore, NewItem};
use crate::metrics;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Item store.
    pub store: Arc<dyn ItemRepository>,
    /// Prometheus handle, present when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around a store.
    pub fn new(store: Arc<dyn ItemRepository>) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `GET /metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::seeded()))
    }
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    /// Always "Pong".
    #[serde(rename = "Ping")]
    pub ping: &'static str,
}

/// Query parameters for listing items.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Exact name to filter on.
    pub filter: Option<String>,
}

/// Liveness check - always returns 200.
pub async fn ping() -> Response {
    response::success(PingResponse { ping: "Pong" })
}

/// List items, optionally filtered by exact name.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let items = match params.filter.as_deref() {
        Some(name) => state.store.list_by_name(name),
        None => state.store.list(),
    }
    .map_err(|e| ApiError::from_store(e, "could not list items"))?;

    Ok(response::success(items))
}

/// Fetch one item.
pub async fn get_item(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Response, ApiError> {
    let item = state
        .store
        .get(id)
        .map_err(|e| ApiError::from_store(e, "could not get item"))?;

    Ok(response::success(item))
}

/// Create an item with a server-assigned id.
pub async fn create_item(
    State(state): State<AppState>,
    JsonBody(values): JsonBody<NewItem>,
) -> Result<Response, ApiError> {
    let item = state
        .store
        .create(values)
        .map_err(|e| ApiError::from_store(e, "could not create item"))?;

    metrics::inc_items_created();
    Ok(response::created(item))
}

/// Replace an item's name and description; the path id wins over any id in the body.
pub async fn update_item(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(values): JsonBody<NewItem>,
) -> Result<Response, ApiError> {
    let item = state
        .store
        .update(id, values)
        .map_err(|e| ApiError::from_store(e, "could not update item"))?;

    metrics::inc_items_updated();
    Ok(response::success(item))
}

/// Delete an item.
pub async fn delete_item(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Response, ApiError> {
    state
        .store
        .delete(id)
        .map_err(|e| ApiError::from_store(e, "could not delete item"))?;

    metrics::inc_items_deleted();
    Ok(response::no_content())
}

/// Copy an item under a new id.
pub async fn duplicate_item(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Response, ApiError> {
    let copy = state
        .store
        .duplicate(id)
        .map_err(|e| ApiError::from_store(e, "could not duplicate item"))?;

    metrics::inc_items_created();
    Ok(response::created(copy))
}

/// CORS preflight: no body processing.
pub async fn preflight() -> Response {
    ().into_response()
}

/// Unmatched method or path under `/items/`.
pub async fn route_does_not_exist() -> Response {
    response::not_found(MSG_NO_ENDPOINT)
}

/// Fallback for every unregistered path.
pub async fn fallback(uri: Uri) -> Response {
    if uri.path().starts_with("/items/") {
        route_does_not_exist().await
    } else {
        response::not_found(MSG_NOT_FOUND)
    }
}

/// Render errors raised by the middleware stack.
pub async fn middleware_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        response::request_timeout(MSG_REQUEST_TIMEOUT)
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        response::internal_error("internal error")
    }
}

/// Prometheus exposition, when a recorder is installed.
pub async fn metrics_text(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => response::not_found(MSG_NOT_FOUND),
    }
}
