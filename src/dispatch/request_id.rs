//! Request identifiers.
//!
//! One id is generated per dispatched request, stored on the context and echoed in the
//! `x-request-id` response header.

use uuid::Uuid;

/// Response header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Source of request ids.
pub trait RequestIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

impl<F> RequestIdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestIds;

impl RequestIdGenerator for UuidRequestIds {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
