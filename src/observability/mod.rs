//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router::build          → logging (route table at debug, summary at info)
//! Engine::dispatch       → AccessLog (one record per request)
//!                            → logging (target `sluice::access`)
//!                            → metrics.rs (counters, histograms)
//! Recovery middleware    → logging (panics at error)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows into every access record
//! - Metrics are cheap facade calls, no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
