//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout, trace)
//!     → service.rs (buffer body, size limit)
//!     → Engine::dispatch
//!     → Send to client
//! ```

pub mod server;
pub mod service;

pub use server::{shutdown_signal, HttpServer};
pub use service::EngineService;
