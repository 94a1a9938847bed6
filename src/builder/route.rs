//! Route records and declaration checks.

use std::fmt;

use crate::context::{Chain, Handler};
use crate::routing::{HttpMethod, RouteError};

/// A flattened route: full path and the complete handler chain, middleware included.
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handlers: Chain,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Methods a declaration registers under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Methods {
    One(HttpMethod),
    Any,
}

impl Methods {
    pub(crate) fn expand(self, excluded: &[HttpMethod]) -> Vec<HttpMethod> {
        match self {
            Methods::One(method) => vec![method],
            Methods::Any => HttpMethod::ALL
                .into_iter()
                .filter(|m| !excluded.contains(m))
                .collect(),
        }
    }
}

/// A route as declared inside one router level, before flattening.
#[derive(Debug)]
pub(crate) struct RouteDecl {
    pub(crate) methods: Methods,
    pub(crate) pattern: String,
    pub(crate) handlers: Vec<Handler>,
}

/// Group prefixes: `/x` or `/x/y`, never empty, never a trailing slash.
pub(crate) fn check_group_pattern(pattern: &str) -> Result<(), RouteError> {
    let invalid = |reason| RouteError::InvalidGroup {
        pattern: pattern.to_string(),
        reason,
    };

    if pattern.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if !pattern.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if pattern.ends_with('/') {
        return Err(invalid("must not end with '/'"));
    }
    if has_empty_segment(pattern) {
        return Err(invalid("must not contain empty segments"));
    }
    Ok(())
}

/// Route patterns. `""` names the enclosing group itself; `/` is only valid at the root.
pub(crate) fn check_route_pattern(pattern: &str, at_root: bool) -> Result<(), RouteError> {
    let invalid = |reason| RouteError::InvalidPath {
        path: pattern.to_string(),
        reason,
    };

    match pattern {
        "" if at_root => Err(invalid("must start with '/'")),
        "" => Ok(()),
        "/" if at_root => Ok(()),
        "/" => Err(invalid("must not end with '/'")),
        _ if !pattern.starts_with('/') => Err(invalid("must start with '/'")),
        _ if pattern.ends_with('/') => Err(invalid("must not end with '/'")),
        _ if has_empty_segment(pattern) => Err(invalid("must not contain empty segments")),
        _ => Ok(()),
    }
}

fn has_empty_segment(pattern: &str) -> bool {
    pattern[1..].split('/').any(str::is_empty)
}
