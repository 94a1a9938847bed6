//! Request dispatch.
//!
//! # Responsibilities
//! - Own one routing tree per method and the optional static-route map
//! - Filter unroutable requests before any lookup
//! - Run the matched handler chain on a pooled context
//! - Emit one access record per request
//!
//! # Data Flow
//! ```text
//! Request<Bytes>
//!     → reject (HTTP/1.0, CONNECT, `*` target)          → 400
//!     → clean_path (optional)                           → 301 to canonical path
//!     → HttpMethod::from_http                           → 405 for unknown methods
//!     → static map → tree                               → chain + params
//!        (miss: not-found chain, or plain 404)
//!     → pooled Context: prepare → run → take_response
//!     → access log
//! ```
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) method slot, exact-path map for fully static routes
//! - Contexts go back to the pool even when a handler panics

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, Request, Response, StatusCode, Version};

use crate::builder::Route;
use crate::config::EngineConfig;
use crate::context::Chain;
use crate::dispatch::path::clean_path;
use crate::dispatch::pool::ContextPool;
use crate::dispatch::request_id::{RequestIdGenerator, X_REQUEST_ID};
use crate::middleware::{AccessEntry, AccessLog};
use crate::routing::{BuildError, HttpMethod, Params, Tree, METHOD_COUNT};

/// One registered route, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub method: HttpMethod,
    pub path: String,
    pub handlers: usize,
}

/// A resolved lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub handlers: Chain,
    pub params: Params,
}

/// Collaborators supplied by the router at build time.
#[derive(Default)]
pub(crate) struct EngineParts {
    pub(crate) not_found: Option<Chain>,
    pub(crate) request_ids: Option<Arc<dyn RequestIdGenerator>>,
    pub(crate) access_log: Option<Arc<dyn AccessLog>>,
}

/// Immutable routing table plus the per-request machinery.
pub struct Engine {
    trees: [Option<Tree<Chain>>; METHOD_COUNT],
    static_routes: [HashMap<String, Chain>; METHOD_COUNT],
    routes: Vec<RouteSummary>,
    not_found: Option<Chain>,
    request_ids: Option<Arc<dyn RequestIdGenerator>>,
    access_log: Option<Arc<dyn AccessLog>>,
    pool: ContextPool,
    config: EngineConfig,
}

impl Engine {
    pub(crate) fn new(
        routes: Vec<Route>,
        parts: EngineParts,
        config: EngineConfig,
    ) -> Result<Self, BuildError> {
        let mut trees: [Option<Tree<Chain>>; METHOD_COUNT] = Default::default();
        let mut static_routes: [HashMap<String, Chain>; METHOD_COUNT] = Default::default();
        let mut summaries = Vec::with_capacity(routes.len());
        let mut errors = Vec::new();

        for route in routes {
            let slot = route.method.index();
            let tree = trees[slot].get_or_insert_with(Tree::new);
            match tree.add(&route.path, Arc::clone(&route.handlers)) {
                Ok(fully_static) => {
                    if config.static_router && fully_static {
                        static_routes[slot].insert(route.path.clone(), Arc::clone(&route.handlers));
                    }
                    tracing::debug!(
                        method = %route.method,
                        path = %route.path,
                        handlers = route.handlers.len(),
                        "Route registered"
                    );
                    summaries.push(RouteSummary {
                        method: route.method,
                        path: route.path,
                        handlers: route.handlers.len(),
                    });
                }
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(BuildError::new(errors));
        }

        tracing::info!(
            routes = summaries.len(),
            static_routes = static_routes.iter().map(HashMap::len).sum::<usize>(),
            not_found_chain = parts.not_found.is_some(),
            "Routing table built"
        );

        Ok(Self {
            trees,
            static_routes,
            routes: summaries,
            not_found: parts.not_found,
            request_ids: parts.request_ids,
            access_log: parts.access_log,
            pool: ContextPool::new(config.pool_capacity),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> &[RouteSummary] {
        &self.routes
    }

    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }

    /// Resolve a method and path without running anything.
    pub fn find(&self, method: HttpMethod, path: &str) -> Option<RouteMatch> {
        let mut params = Params::new();
        let handlers = self.lookup_into(method, path, &mut params)?;
        Some(RouteMatch { handlers, params })
    }

    fn lookup_into(&self, method: HttpMethod, path: &str, params: &mut Params) -> Option<Chain> {
        let slot = method.index();
        if self.config.static_router {
            if let Some(chain) = self.static_routes[slot].get(path) {
                return Some(Arc::clone(chain));
            }
        }
        self.trees[slot]
            .as_ref()?
            .find_into(path, params)
            .cloned()
    }

    /// Handle one request to completion.
    pub fn dispatch(&self, request: Request<Bytes>) -> Response<Body> {
        let started = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let response = self.respond(request);

        if let Some(log) = &self.access_log {
            let request_id = response
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok());
            log.record(&AccessEntry {
                status: response.status(),
                method: &method,
                path: &path,
                elapsed: started.elapsed(),
                request_id,
            });
        }
        response
    }

    fn respond(&self, request: Request<Bytes>) -> Response<Body> {
        if let Some(reason) = unroutable(&request) {
            tracing::debug!(reason, uri = %request.uri(), "Request rejected");
            return status_response(StatusCode::BAD_REQUEST);
        }

        if self.config.redirect_fixed_path {
            let uri = request.uri();
            if let Cow::Owned(cleaned) = clean_path(uri.path()) {
                let location = match uri.query() {
                    Some(query) => format!("{cleaned}?{query}"),
                    None => cleaned,
                };
                return redirect_response(&location);
            }
        }

        let Some(method) = HttpMethod::from_http(request.method()) else {
            return status_response(StatusCode::METHOD_NOT_ALLOWED);
        };

        let mut ctx = self.pool.acquire();
        let chain = match self.lookup_into(method, request.uri().path(), ctx.params_mut()) {
            Some(chain) => chain,
            None => match &self.not_found {
                Some(chain) => Arc::clone(chain),
                None => return status_response(StatusCode::NOT_FOUND),
            },
        };

        let request_id = self.request_ids.as_ref().map(|g| g.generate());
        ctx.prepare(request, chain, request_id.clone());
        ctx.run();

        let mut response = ctx.take_response();
        if let Some(value) = request_id.and_then(|id| HeaderValue::from_str(&id).ok()) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        response
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("routes", &self.routes.len())
            .field("not_found", &self.not_found.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Requests the engine refuses to route.
fn unroutable(request: &Request<Bytes>) -> Option<&'static str> {
    if matches!(request.version(), Version::HTTP_09 | Version::HTTP_10) {
        return Some("protocol older than HTTP/1.1");
    }
    if *request.method() == Method::CONNECT {
        return Some("CONNECT is not routable");
    }
    if request.uri().path() == "*" {
        return Some("asterisk-form target");
    }
    None
}

fn status_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

fn redirect_response(location: &str) -> Response<Body> {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = status_response(StatusCode::MOVED_PERMANENTLY);
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => status_response(StatusCode::BAD_REQUEST),
    }
}
