//! Dispatch subsystem.
//!
//! - `engine.rs`: per-request lookup and chain execution
//! - `pool.rs`: context reuse with mandatory reset
//! - `path.rs`: canonical path computation for fixed-path redirects
//! - `request_id.rs`: per-request identifiers

pub mod engine;
pub mod path;
pub mod pool;
pub mod request_id;

pub use engine::{Engine, RouteMatch, RouteSummary};
pub use path::clean_path;
pub use pool::{ContextPool, PooledContext};
pub use request_id::{RequestIdGenerator, UuidRequestIds, X_REQUEST_ID};
