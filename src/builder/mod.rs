//! Route builder subsystem.
//!
//! # Data Flow
//! ```text
//! Router / nested groups (declaration order)
//!     → router.rs (collect routes, groups, middleware; early checks)
//!     → flatten: depth-first, prefix + pattern, ancestor middleware first
//!     → route.rs (Route { method, path, chain })
//!     → Engine::new (per-method trees)
//! ```
//!
//! # Design Decisions
//! - Mutated only during startup, consumed by `build`
//! - Duplicate groups are caught at declaration, duplicate routes at flattening

pub mod route;
pub mod router;

pub use route::Route;
pub use router::Router;
