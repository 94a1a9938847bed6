//! Panic containment for the handler chain.
//!
//! # Responsibilities
//! - Catch a panic raised by any handler downstream of this one
//! - Guarantee a status is written (500 unless something was already sent)
//! - Stop the chain and log the fault
//!
//! # Design Decisions
//! - Registered first in the chain so it wraps everything after it
//! - The only place in the crate that catches unwinding
//! - Panic text stays out of responses unless explicitly enabled

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use axum::http::StatusCode;

use crate::context::{Context, Handle, Handler};

/// Fault boundary middleware.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recovery {
    expose_details: bool,
}

impl Recovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the panic message into the 500 body.
    pub fn expose_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

impl Handle for Recovery {
    fn handle(&self, ctx: &mut Context) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| ctx.next()));
        let Err(payload) = outcome else {
            return;
        };

        let message = panic_message(payload.as_ref());
        tracing::error!(
            method = %ctx.method(),
            path = %ctx.path(),
            request_id = ctx.request_id().unwrap_or("-"),
            panic = %message,
            "Handler panicked"
        );

        if !ctx.is_written() {
            if self.expose_details {
                ctx.text(StatusCode::INTERNAL_SERVER_ERROR, format!("panic: {message}"));
            } else {
                ctx.write_header(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
        ctx.abort();
    }
}

/// Recovery with panic details hidden.
pub fn recovery() -> Handler {
    Handler::object(Recovery::new())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
