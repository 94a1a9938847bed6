//! Built-in middleware.
//!
//! - `recovery.rs`: fault boundary, registered first in a chain
//! - `access_log.rs`: per-request access records emitted by the engine

pub mod access_log;
pub mod recovery;

pub use access_log::{AccessEntry, AccessLog, TracingAccessLog};
pub use recovery::{recovery, Recovery};
