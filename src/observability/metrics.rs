//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sluice_requests_total` (counter): requests by method, status
//! - `sluice_request_duration_seconds` (histogram): dispatch latency by method
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed recorder it is a no-op
//! - The Prometheus exporter is opt-in and owned by the binary

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the global Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    ::metrics::counter!(
        "sluice_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("sluice_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}
