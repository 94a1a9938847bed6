//! Tower adapter for the dispatch engine.
//!
//! # Responsibilities
//! - Buffer the request body up to the configured limit
//! - Hand the buffered request to `Engine::dispatch`
//!
//! # Design Decisions
//! - Infallible: every outcome, including an oversized body, is an HTTP response
//! - Cloning the service clones an `Arc`

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use tower::Service;

use crate::dispatch::Engine;

/// `tower::Service` wrapping a shared [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineService {
    engine: Arc<Engine>,
    max_body_bytes: usize,
}

impl EngineService {
    pub fn new(engine: Arc<Engine>, max_body_bytes: usize) -> Self {
        Self {
            engine,
            max_body_bytes,
        }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

impl Service<Request<Body>> for EngineService {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let engine = Arc::clone(&self.engine);
        let limit = self.max_body_bytes;

        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let bytes = match axum::body::to_bytes(body, limit).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(path = %parts.uri.path(), error = %e, "Request body rejected");
                    let mut response = Response::new(Body::empty());
                    *response.status_mut() = StatusCode::PAYLOAD_TOO_LARGE;
                    return Ok(response);
                }
            };

            Ok(engine.dispatch(Request::from_parts(parts, bytes)))
        })
    }
}
