//! Build-time routing errors.
//!
//! Every variant describes a programming error in the route declarations. None of them can
//! occur while serving traffic.

use thiserror::Error;

use crate::routing::method::HttpMethod;

/// A single path segment pattern failed to compile.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern `{pattern}` contains whitespace")]
    Whitespace { pattern: String },

    #[error("pattern `{pattern}` has malformed brackets")]
    MalformedBrackets { pattern: String },

    #[error("pattern `{pattern}` declares invalid parameter name `{name}`")]
    InvalidName { pattern: String, name: String },

    #[error("placeholder `{pattern}` must bind exactly one name, found {count}")]
    HolderArity { pattern: String, count: usize },

    #[error("expression `{pattern}` must bind at least one name")]
    MissingNames { pattern: String },

    #[error("expression in `{pattern}` is invalid: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("expression `{pattern}` binds {names} name(s) but has {groups} capture group(s)")]
    CaptureCount {
        pattern: String,
        names: usize,
        groups: usize,
    },
}

/// A route or group declaration is unusable.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route `{path}`: {source}")]
    Pattern {
        path: String,
        #[source]
        source: PatternError,
    },

    #[error("route path `{path}` is invalid: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("group pattern `{pattern}` is invalid: {reason}")]
    InvalidGroup { pattern: String, reason: &'static str },

    #[error("group `{pattern}` declared twice under the same parent")]
    DuplicateGroup { pattern: String },

    #[error("route {method} {path} registered twice")]
    DuplicateRoute { method: HttpMethod, path: String },

    #[error("route `{path}` has no handlers")]
    EmptyChain { path: String },

    #[error("pattern `{path}` already occupies this position in the tree")]
    Conflict { path: String },

    #[error("group `{prefix}` cannot declare a not-found chain; only the root router can")]
    GroupNotFound { prefix: String },
}

/// Every error found while building an engine.
#[derive(Debug, Error)]
#[error("route table rejected ({} error(s)): {}", .errors.len(), join(.errors))]
pub struct BuildError {
    pub errors: Vec<RouteError>,
}

impl BuildError {
    pub fn new(errors: Vec<RouteError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[RouteError] {
        &self.errors
    }
}

fn join(errors: &[RouteError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
