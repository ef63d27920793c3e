//! Metrics collection and exposition.
//!
//! # Metrics
//! - `todo_requests_total` (counter): requests by method and status
//! - `todo_request_duration_seconds` (histogram): latency distribution
//! - `todo_rate_limited_total` (counter): rejected requests
//! - `todo_task_operations_total` (counter): store mutations by operation

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "todo_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!("todo_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a rate-limited rejection.
pub fn record_rate_limited() {
    metrics::counter!("todo_rate_limited_total").increment(1);
}

/// Record a task store mutation.
pub fn record_task_op(op: &'static str) {
    metrics::counter!("todo_task_operations_total", "op" => op).increment(1);
}
