//! Service middleware for request metrics.
//!
//! ## Metrics Exposed
//!
//! - `risk_kernel_requests_total` - request count by path, method, status
//! - `risk_kernel_request_duration_seconds` - request latency
//! - `risk_kernel_computation` - entities and cutsets per computed metric

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::info;

/// Metrics middleware that records request counts and latency.
///
/// Uses tracing for now; the log lines can be aggregated downstream.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "risk_kernel::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

/// Normalize path for metrics to avoid high cardinality.
///
/// Attribute selector segments become `:att` and `:val`.
fn normalize_path(path: &str) -> String {
    static SELECTOR: OnceLock<regex_lite::Regex> = OnceLock::new();
    let selector = SELECTOR.get_or_init(|| {
        regex_lite::Regex::new(r"^/attribute/[^/]+/[^/]+/").expect("selector pattern is valid")
    });

    selector.replace(path, "/attribute/:att/:val/").to_string()
}

/// Record the size of a computation.
///
/// Call this after a metric has been served to track graph and result sizes.
pub fn record_computation(metric: &str, entity_count: usize, result_count: usize, latency_ms: u64) {
    info!(
        target: "risk_kernel::metrics",
        metric_type = "computation",
        metric = metric,
        entity_count = entity_count,
        result_count = result_count,
        latency_ms = latency_ms,
        "computation_metric"
    );
}
