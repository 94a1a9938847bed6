//! Access logging.
//!
//! The engine hands every finished request to an [`AccessLog`]. The default implementation emits
//! a structured `tracing` event on the `sluice::access` target and records request metrics.

use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::observability::metrics;

/// What is known about a request once its response is ready.
#[derive(Debug, Clone, Copy)]
pub struct AccessEntry<'a> {
    pub status: StatusCode,
    pub method: &'a Method,
    pub path: &'a str,
    pub elapsed: Duration,
    pub request_id: Option<&'a str>,
}

/// Sink for per-request access records.
pub trait AccessLog: Send + Sync {
    fn record(&self, entry: &AccessEntry<'_>);
}

impl<F> AccessLog for F
where
    F: Fn(&AccessEntry<'_>) + Send + Sync,
{
    fn record(&self, entry: &AccessEntry<'_>) {
        self(entry)
    }
}

/// Structured log line plus request metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAccessLog;

impl AccessLog for TracingAccessLog {
    fn record(&self, entry: &AccessEntry<'_>) {
        tracing::info!(
            target: "sluice::access",
            status = entry.status.as_u16(),
            method = %entry.method,
            path = %entry.path,
            elapsed_us = entry.elapsed.as_micros() as u64,
            request_id = entry.request_id.unwrap_or("-"),
            "Request completed"
        );
        metrics::record_request(entry.method.as_str(), entry.status.as_u16(), entry.elapsed);
    }
}
