//! Handler kinds.
//!
//! A handler is either a plain function/closure or an object implementing [`Handle`]. The
//! variant is fixed when the route is declared; dispatch is a single match.

use std::fmt;
use std::sync::Arc;

use crate::context::request::Context;

/// Object-style handler.
pub trait Handle: Send + Sync + 'static {
    fn handle(&self, ctx: &mut Context);
}

/// One entry of a handler chain.
#[derive(Clone)]
pub enum Handler {
    Func(Arc<dyn Fn(&mut Context) + Send + Sync>),
    Object(Arc<dyn Handle>),
}

/// Resolved, shared handler chain of a route.
pub type Chain = Arc<[Handler]>;

impl Handler {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        Handler::Func(Arc::new(f))
    }

    pub fn object<H: Handle>(handler: H) -> Self {
        Handler::Object(Arc::new(handler))
    }

    #[inline]
    pub fn handle(&self, ctx: &mut Context) {
        match self {
            Handler::Func(f) => f(ctx),
            Handler::Object(h) => h.handle(ctx),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Func(_) => f.write_str("Handler::Func"),
            Handler::Object(_) => f.write_str("Handler::Object"),
        }
    }
}

/// Conversion used by [`chain!`](crate::chain) and the registration API.
pub trait IntoHandler {
    fn into_handler(self) -> Handler;
}

impl IntoHandler for Handler {
    fn into_handler(self) -> Handler {
        self
    }
}

impl<F> IntoHandler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn into_handler(self) -> Handler {
        Handler::func(self)
    }
}

/// Build a `Vec<Handler>` from functions, annotated closures and [`Handler`] values.
///
/// ```ignore
/// router.get("/users/<id>", chain![auth, show_user]);
/// ```
#[macro_export]
macro_rules! chain {
    ($($handler:expr),* $(,)?) => {
        vec![$($crate::context::IntoHandler::into_handler($handler)),*]
    };
}
