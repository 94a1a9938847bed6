//! Request context and middleware chain.
//!
//! # Data Flow
//! ```text
//! Dispatch engine
//!     → pooled Context (params + chain + request)
//!     → handler[0] ── ctx.next() ──▶ handler[1] ── ... ──▶ handler[n]
//!     ◀── returns unwind in reverse, so middleware can act after downstream
//!     → buffered response taken by the engine
//! ```
//!
//! # Design Decisions
//! - Writing a status is the only short-circuit signal handlers need
//! - Handler kind (function or object) resolved at registration, not per request

pub mod handler;
pub mod request;

pub use handler::{Chain, Handle, Handler, IntoHandler};
pub use request::Context;
