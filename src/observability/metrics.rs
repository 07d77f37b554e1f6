//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): proxied requests by backend, status
//! - `lb_request_duration_seconds` (histogram): latency by backend
//! - `lb_failovers_total` (counter): reactive failover attempts
//! - `lb_backend_health` (gauge): 1=eligible, 0=excluded, per probe

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(backend: &str, status: u16, start: Instant) {
    metrics::counter!(
        "lb_requests_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("lb_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_failover() {
    metrics::counter!("lb_failovers_total").increment(1);
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    metrics::gauge!("lb_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
