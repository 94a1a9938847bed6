//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     flattened Route list
//!     → pattern.rs (compile each path segment)
//!     → tree.rs (insert into the tree for the route's method)
//!     → Freeze as immutable per-method trees
//!
//! Request Lookup:
//!     (method, path)
//!     → method.rs (method → table index)
//!     → tree.rs (depth-first match with backtracking)
//!     → Return: stored handler chain + params, or no match
//! ```
//!
//! # Design Decisions
//! - Trees compiled at startup, immutable at runtime
//! - Sibling precedence: static, regexp, placeholder, match-all
//! - Deterministic: same path always resolves to the same route and params
//! - Bad patterns are build errors, never runtime conditions

pub mod error;
pub mod method;
pub mod params;
pub mod pattern;
pub mod tree;

pub use error::{BuildError, PatternError, RouteError};
pub use method::{HttpMethod, METHOD_COUNT};
pub use params::{Param, ParamError, Params};
pub use pattern::{PatternSegment, SegmentKind};
pub use tree::{Matched, Tree};
