//! Metrics collection and exposition.
//!
//! # Metrics
//! - `vj_requests_total` (counter): dispatched requests by method, status
//! - `vj_request_duration_seconds` (histogram): request latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener. Failure to bind is
/// logged and the server runs without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics endpoint listening"),
        Err(err) => tracing::error!(error = %err, "failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_dispatch(method: &str, status: u16, start: Instant) {
    counter!(
        "vj_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("vj_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
