//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by endpoint and status
//! - `api_request_duration_seconds` (histogram): latency by endpoint

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener. Called at most
/// once at startup, and only when metrics are enabled in config.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(error) => tracing::error!(%error, "Failed to install metrics exporter"),
    }
}

/// Record one handled request. Safe to call whether or not the exporter
/// is installed; without it the macros write into a no-op recorder.
pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    let labels = [
        ("endpoint", endpoint.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("api_requests_total", &labels).increment(1);
    metrics::histogram!("api_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}
