//! Sluice: HTTP routing tree and dispatch engine.
//!
//! # Architecture Overview
//!
//! ```text
//!     Startup                                   Per request
//!     ───────                                   ───────────
//!     Router / groups                           Request
//!         │ declare routes + middleware             │
//!         ▼                                         ▼
//!     builder::flatten ──▶ Route list          http::EngineService (buffer body)
//!         │                                         │
//!         ▼                                         ▼
//!     Engine::new                               Engine::dispatch
//!         │ per-method routing::Tree                │ reject / redirect / lookup
//!         │ optional static map                     ▼
//!         ▼                                     pooled context::Context
//!     Arc<Engine> ─────────────────────────────▶    │ run handler chain
//!                                                   ▼
//!                                               Response + access log
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sluice::{chain, Context, EngineConfig, Router};
//! use axum::http::StatusCode;
//!
//! fn show(ctx: &mut Context) {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     ctx.text(StatusCode::OK, id);
//! }
//!
//! let mut router = Router::classic();
//! router.group("/users", |users| {
//!     users.get(r"/<id:int ~ \d+>", chain![show]);
//! });
//! let engine = router.build(&EngineConfig::default())?;
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod http;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use builder::{Route, Router};
pub use config::{EngineConfig, ServerConfig, SluiceConfig};
pub use context::{Chain, Context, Handle, Handler, IntoHandler};
pub use dispatch::{Engine, RouteMatch, RouteSummary};
pub use http::{EngineService, HttpServer};
pub use routing::{BuildError, HttpMethod, ParamError, Params, RouteError};
