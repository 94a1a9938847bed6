//! Closed set of routable HTTP methods.
//!
//! # Responsibilities
//! - Map request methods onto a small integer index
//! - Enumerate the methods `ANY` expands to
//!
//! # Design Decisions
//! - Fixed array index instead of a hash lookup on the hot path
//! - Methods outside the set never reach a routing tree

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of routable methods; size of every per-method table.
pub const METHOD_COUNT: usize = 8;

/// An HTTP method the engine keeps a routing tree for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
    Put,
    Patch,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Every routable method, in index order.
    pub const ALL: [HttpMethod; METHOD_COUNT] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    /// Slot of this method in per-method tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve a request method. `None` for CONNECT and extension methods.
    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(HttpMethod::Get),
            Method::POST => Some(HttpMethod::Post),
            Method::DELETE => Some(HttpMethod::Delete),
            Method::PUT => Some(HttpMethod::Put),
            Method::PATCH => Some(HttpMethod::Patch),
            Method::HEAD => Some(HttpMethod::Head),
            Method::OPTIONS => Some(HttpMethod::Options),
            Method::TRACE => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method name is not routable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}
