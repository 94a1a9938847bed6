//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Response};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use sluice::config::ServerConfig;
use sluice::{Engine, HttpServer};

/// A server running in the background; dropping `shutdown` stops it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Serve `engine` on an ephemeral local port.
pub async fn spawn_server(engine: Engine) -> TestServer {
    spawn_server_with(engine, ServerConfig::default()).await
}

pub async fn spawn_server_with(engine: Engine, config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel::<()>();

    let server = HttpServer::new(Arc::new(engine), config);
    tokio::spawn(async move {
        let _ = server
            .run(listener, async {
                let _ = rx.await;
            })
            .await;
    });

    TestServer { addr, shutdown }
}

/// Build an in-memory request for `Engine::dispatch`.
pub fn request(method: Method, path: &str) -> Request<Bytes> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

pub fn get(path: &str) -> Request<Bytes> {
    request(Method::GET, path)
}

/// Collect a dispatched response body as UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
