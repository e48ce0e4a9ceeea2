//! HTTP API route definitions.
//!
//! Middleware order, outermost first: access log, request metrics, request
//! timeout, then the per-route CORS method header.

use std::time::Duration;

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{info, info_span, Level, Span};

use super::handlers::{
    create_item, delete_item, duplicate_item, fallback, get_item, list_items, metrics_text,
    middleware_error, ping, preflight, route_does_not_exist, update_item, AppState,
};
use crate::metrics;

/// Methods registered on `/items/`.
pub const COLLECTION_METHODS: &str = "GET,POST,OPTIONS";
/// Methods registered on `/items/{id}`.
pub const ITEM_METHODS: &str = "GET,PUT,DELETE,OPTIONS";
/// Methods registered on `/items/{id}/duplicate`.
pub const DUPLICATE_METHODS: &str = "POST,OPTIONS";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn allow_methods(methods: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(methods),
    )
}

/// Fail requests running longer than `timeout` with a JSON 408.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(middleware_error))
            .timeout(timeout),
    )
}

/// Create the API router with the default request timeout.
pub fn create_router(state: AppState) -> Router {
    router_with_timeout(state, DEFAULT_REQUEST_TIMEOUT)
}

/// Create the API router.
pub fn router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        // Health endpoints
        .route("/ping", get(ping))
        .route("/metrics", get(metrics_text))
        // Item endpoints
        .route(
            "/items/",
            get(list_items)
                .post(create_item)
                .options(preflight)
                .fallback(route_does_not_exist)
                .layer(allow_methods(COLLECTION_METHODS)),
        )
        .route(
            "/items/:id",
            get(get_item)
                .put(update_item)
                .delete(delete_item)
                .options(preflight)
                .fallback(route_does_not_exist)
                .layer(allow_methods(ITEM_METHODS)),
        )
        .route(
            "/items/:id/duplicate",
            post(duplicate_item)
                .options(preflight)
                .fallback(route_does_not_exist)
                .layer(allow_methods(DUPLICATE_METHODS)),
        )
        .fallback(fallback)
        .with_state(state);

    with_request_timeout(router, request_timeout)
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path()
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!(method = %request.method(), path = %request.uri().path(), "request");
                })
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::DEBUG)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}
