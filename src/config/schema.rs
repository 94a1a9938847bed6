//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and every field has a
//! default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::routing::HttpMethod;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SluiceConfig {
    /// Listener and transport limits.
    pub server: ServerConfig,

    /// Dispatch engine behaviour.
    pub engine: EngineConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout enforced by the server.
    pub request_timeout_secs: u64,

    /// Request bodies above this size are rejected with 413.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Dispatch engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Redirect (301) requests whose path is not canonical, e.g. `/a//b/../c`.
    pub redirect_fixed_path: bool,

    /// Serve fully static routes from an exact-path map before walking the tree.
    pub static_router: bool,

    /// Methods `ANY` does not register.
    pub any_excluded_methods: Vec<HttpMethod>,

    /// Emit one access log entry per request.
    pub access_log: bool,

    /// Generate a request id for every dispatched request.
    pub request_ids: bool,

    /// Include the panic message in 500 bodies written by the recovery middleware.
    pub expose_panic_details: bool,

    /// Idle contexts kept for reuse.
    pub pool_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            redirect_fixed_path: true,
            static_router: false,
            any_excluded_methods: vec![HttpMethod::Head, HttpMethod::Options],
            access_log: true,
            request_ids: true,
            expose_panic_details: false,
            pool_capacity: 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
