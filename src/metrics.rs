//! Prometheus metrics for request and store activity.
//!
//! The binary installs a Prometheus recorder at startup and serves it on
//! `GET /metrics`. Without a recorder the macros are no-ops, which keeps
//! tests and embedded routers free of global state.

use std::time::Instant;

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::error::ServiceError;

// === Metric Name Constants ===

/// HTTP request counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Items created counter metric name.
pub const METRIC_ITEMS_CREATED: &str = "items_created_total";
/// Items updated counter metric name.
pub const METRIC_ITEMS_UPDATED: &str = "items_updated_total";
/// Items deleted counter metric name.
pub const METRIC_ITEMS_DELETED: &str = "items_deleted_total";

/// Install the global Prometheus recorder and describe all metrics.
/// Call this once at startup.
pub fn init_metrics() -> Result<PrometheusHandle, ServiceError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_counter!(METRIC_ITEMS_CREATED, "Total number of items created or duplicated");
    describe_counter!(METRIC_ITEMS_UPDATED, "Total number of items updated");
    describe_counter!(METRIC_ITEMS_DELETED, "Total number of items deleted");

    debug!("Metrics initialized");
    Ok(handle)
}

/// Record one served request.
pub fn record_http_request(start: Instant, method: &str, status: u16) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "method" => method.to_string()).record(latency_ms);
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Increment items created counter.
pub fn inc_items_created() {
    counter!(METRIC_ITEMS_CREATED).increment(1);
}

/// Increment items updated counter.
pub fn inc_items_updated() {
    counter!(METRIC_ITEMS_UPDATED).increment(1);
}

/// Increment items deleted counter.
pub fn inc_items_deleted() {
    counter!(METRIC_ITEMS_DELETED).increment(1);
}

/// Middleware recording latency and status of every request.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    record_http_request(start, method.as_str(), response.status().as_u16());
    response
}
