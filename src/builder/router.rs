//! Route declaration API.
//!
//! # Responsibilities
//! - Collect routes, groups and middleware in declaration order
//! - Detect duplicate groups when they are declared
//! - Flatten the declaration tree into routes with full paths and chains
//! - Build the dispatch engine
//!
//! # Design Decisions
//! - Groups compose paths by plain string concatenation
//! - Middleware of a level applies to every route of that level and below,
//!   whenever it was added
//! - Every declaration error is collected; `build` reports them together

use std::collections::HashSet;
use std::sync::Arc;

use crate::builder::route::{check_group_pattern, check_route_pattern, Methods, Route, RouteDecl};
use crate::config::EngineConfig;
use crate::context::{Chain, Handler, IntoHandler};
use crate::dispatch::engine::{Engine, EngineParts};
use crate::dispatch::request_id::{RequestIdGenerator, UuidRequestIds};
use crate::middleware::{recovery, AccessLog, TracingAccessLog};
use crate::routing::{BuildError, HttpMethod, RouteError};

#[derive(Debug)]
enum Entry {
    Route(RouteDecl),
    Group(Router),
}

/// Route table under construction. Groups are routers nested under a prefix.
#[derive(Default)]
pub struct Router {
    /// Full path prefix; empty at the root.
    prefix: String,
    middleware: Vec<Handler>,
    entries: Vec<Entry>,
    group_patterns: HashSet<String>,
    errors: Vec<RouteError>,

    // Root only.
    not_found: Vec<Handler>,
    request_ids: Option<Arc<dyn RequestIdGenerator>>,
    access_log: Option<Arc<dyn AccessLog>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with the recovery middleware already installed.
    pub fn classic() -> Self {
        let mut router = Self::new();
        router.use_middleware([recovery()]);
        router
    }

    fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Add middleware that runs before the handlers of every route at this level and below.
    pub fn use_middleware<I>(&mut self, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.middleware
            .extend(handlers.into_iter().map(IntoHandler::into_handler));
        self
    }

    /// Alias of [`use_middleware`](Self::use_middleware).
    pub fn before<I>(&mut self, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.use_middleware(handlers)
    }

    /// Declare routes under `pattern`.
    ///
    /// ```ignore
    /// router.group("/api", |api| {
    ///     api.use_middleware(chain![auth]);
    ///     api.get("/users/<id>", chain![show_user]);
    /// });
    /// ```
    pub fn group<F>(&mut self, pattern: &str, declare: F) -> &mut Self
    where
        F: FnOnce(&mut Router),
    {
        if let Err(e) = check_group_pattern(pattern) {
            self.errors.push(e);
            return self;
        }

        let prefix = format!("{}{}", self.prefix, pattern);
        if !self.group_patterns.insert(pattern.to_string()) {
            self.errors.push(RouteError::DuplicateGroup { pattern: prefix });
            return self;
        }

        let mut group = Router {
            prefix,
            ..Router::default()
        };
        declare(&mut group);
        self.entries.push(Entry::Group(group));
        self
    }

    /// Register `handlers` for `method` at `pattern`.
    pub fn handle<I>(&mut self, method: HttpMethod, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.declare(Methods::One(method), pattern, handlers)
    }

    pub fn get<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.handle(HttpMethod::Get, pattern, handlers)
    }

    pub fn post<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.handle(HttpMethod::Post, pattern, handlers)
    }

    pub fn put<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.handle(HttpMethod::Put, pattern, handlers)
    }

    pub fn delete<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.handle(HttpMethod::Delete, pattern, handlers)
    }

    pub fn patch<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.handle(HttpMethod::Patch, pattern, handlers)
    }

    pub fn head<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.handle(HttpMethod::Head, pattern, handlers)
    }

    pub fn options<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.handle(HttpMethod::Options, pattern, handlers)
    }

    pub fn trace<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.handle(HttpMethod::Trace, pattern, handlers)
    }

    /// Register for every method except `EngineConfig::any_excluded_methods`.
    pub fn any<I>(&mut self, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        self.declare(Methods::Any, pattern, handlers)
    }

    fn declare<I>(&mut self, methods: Methods, pattern: &str, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        if let Err(e) = check_route_pattern(pattern, self.is_root()) {
            self.errors.push(e);
            return self;
        }

        let handlers: Vec<Handler> = handlers.into_iter().map(IntoHandler::into_handler).collect();
        if handlers.is_empty() {
            self.errors.push(RouteError::EmptyChain {
                path: format!("{}{}", self.prefix, pattern),
            });
            return self;
        }

        self.entries.push(Entry::Route(RouteDecl {
            methods,
            pattern: pattern.to_string(),
            handlers,
        }));
        self
    }

    /// Handlers for requests no route matches. Root middleware runs first.
    ///
    /// Only the root router may declare one; on a group it is a build error.
    pub fn not_found<I>(&mut self, handlers: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoHandler,
    {
        if !self.is_root() {
            self.errors.push(RouteError::GroupNotFound {
                prefix: self.prefix.clone(),
            });
            return self;
        }
        self.not_found = handlers.into_iter().map(IntoHandler::into_handler).collect();
        self
    }

    /// Replace the request id generator used when `EngineConfig::request_ids` is set.
    pub fn request_ids<G>(&mut self, generator: G) -> &mut Self
    where
        G: RequestIdGenerator + 'static,
    {
        self.request_ids = Some(Arc::new(generator));
        self
    }

    /// Replace the access logger used when `EngineConfig::access_log` is set.
    pub fn access_log<L>(&mut self, logger: L) -> &mut Self
    where
        L: AccessLog + 'static,
    {
        self.access_log = Some(Arc::new(logger));
        self
    }

    /// Flatten into routes in declaration order, without building trees.
    pub fn into_routes(self, config: &EngineConfig) -> Result<Vec<Route>, BuildError> {
        let mut routes = Vec::new();
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        self.flatten(&[], config, &mut seen, &mut routes, &mut errors);

        if errors.is_empty() {
            Ok(routes)
        } else {
            Err(BuildError::new(errors))
        }
    }

    /// Validate the declarations and compile the engine.
    pub fn build(mut self, config: &EngineConfig) -> Result<Engine, BuildError> {
        let not_found: Option<Chain> = if self.not_found.is_empty() {
            None
        } else {
            let handlers = std::mem::take(&mut self.not_found);
            Some(self.middleware.iter().cloned().chain(handlers).collect())
        };

        let request_ids = match self.request_ids.take() {
            Some(custom) if config.request_ids => Some(custom),
            None if config.request_ids => {
                Some(Arc::new(UuidRequestIds) as Arc<dyn RequestIdGenerator>)
            }
            _ => None,
        };
        let access_log = match self.access_log.take() {
            Some(custom) if config.access_log => Some(custom),
            None if config.access_log => Some(Arc::new(TracingAccessLog) as Arc<dyn AccessLog>),
            _ => None,
        };

        let routes = self.into_routes(config)?;
        Engine::new(
            routes,
            EngineParts {
                not_found,
                request_ids,
                access_log,
            },
            config.clone(),
        )
    }

    fn flatten(
        self,
        inherited: &[Handler],
        config: &EngineConfig,
        seen: &mut HashSet<(HttpMethod, String)>,
        routes: &mut Vec<Route>,
        errors: &mut Vec<RouteError>,
    ) {
        errors.extend(self.errors);

        let mut middleware = inherited.to_vec();
        middleware.extend(self.middleware);

        for entry in self.entries {
            match entry {
                Entry::Route(decl) => {
                    let path = match (self.prefix.as_str(), decl.pattern.as_str()) {
                        ("", pattern) => pattern.to_string(),
                        (prefix, pattern) => format!("{prefix}{pattern}"),
                    };
                    let handlers: Chain = middleware.iter().cloned().chain(decl.handlers).collect();

                    for method in decl.methods.expand(&config.any_excluded_methods) {
                        if !seen.insert((method, path.clone())) {
                            errors.push(RouteError::DuplicateRoute {
                                method,
                                path: path.clone(),
                            });
                            continue;
                        }
                        routes.push(Route {
                            method,
                            path: path.clone(),
                            handlers: Arc::clone(&handlers),
                        });
                    }
                }
                Entry::Group(group) => group.flatten(&middleware, config, seen, routes, errors),
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.len())
            .field("entries", &self.entries)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
