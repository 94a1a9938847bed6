//! Per-request context and the cooperative handler chain.
//!
//! # Responsibilities
//! - Carry the request, its path parameters and a typed extension map
//! - Drive the handler chain (`next`, `abort`)
//! - Buffer the response behind a write-once status guard
//!
//! # Design Decisions
//! - Handlers are synchronous and run in chain order on one task
//! - The chain stops as soon as a response status has been written
//! - Contexts are recycled by the dispatch pool; `reset` clears every field

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap, HeaderValue, InvalidHeaderValue};
use axum::http::{Extensions, Method, Request, Response, StatusCode, Uri, Version};
use serde::Serialize;

use crate::context::handler::Chain;
use crate::routing::Params;

/// Mutable state of one in-flight request.
#[derive(Debug, Default)]
pub struct Context {
    method: Method,
    uri: Uri,
    version: Version,
    request_headers: HeaderMap,
    request_body: Bytes,

    params: Params,
    chain: Option<Chain>,
    cursor: usize,

    status: Option<StatusCode>,
    response_headers: HeaderMap,
    response_body: Vec<u8>,

    extensions: Extensions,
    request_id: Option<String>,
}

impl Context {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    /// Request body, fully buffered before the chain runs.
    pub fn body(&self) -> &Bytes {
        &self.request_body
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Per-request typed key/value store.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    // -- chain control --

    /// Run the remaining handlers, returning once they have finished.
    pub fn next(&mut self) {
        self.cursor += 1;
        self.run();
    }

    /// Skip every handler after the current one.
    pub fn abort(&mut self) {
        self.cursor = self.chain_len();
    }

    pub fn abort_with_status(&mut self, status: StatusCode) {
        self.write_header(status);
        self.abort();
    }

    // -- response --

    /// Whether a status line has been written.
    pub fn is_written(&self) -> bool {
        self.status.is_some()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Set the response status. Only the first call takes effect.
    pub fn write_header(&mut self, status: StatusCode) {
        match self.status {
            Some(current) => {
                tracing::warn!(
                    current = %current,
                    attempted = %status,
                    path = %self.uri.path(),
                    "Response status already written"
                );
            }
            None => self.status = Some(status),
        }
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn header_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    /// Append to the response body, writing `200 OK` first if nothing was written.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        if !self.is_written() {
            self.write_header(StatusCode::OK);
        }
        self.response_body.extend_from_slice(bytes.as_ref());
    }

    pub fn text(&mut self, status: StatusCode, body: impl AsRef<str>) {
        self.set_default_content_type("text/plain; charset=utf-8");
        self.write_header(status);
        self.write(body.as_ref());
    }

    /// Serialize `value` as the JSON response body. Nothing is written on error.
    pub fn json<T: Serialize>(
        &mut self,
        status: StatusCode,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.set_default_content_type("application/json");
        self.write_header(status);
        self.write(body);
        Ok(())
    }

    pub fn redirect(
        &mut self,
        status: StatusCode,
        location: &str,
    ) -> Result<(), InvalidHeaderValue> {
        let value = HeaderValue::from_str(location)?;
        self.response_headers.insert(header::LOCATION, value);
        self.write_header(status);
        Ok(())
    }

    fn set_default_content_type(&mut self, content_type: &'static str) {
        self.response_headers
            .entry(header::CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(content_type));
    }

    // -- engine side --

    pub(crate) fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    pub(crate) fn prepare(
        &mut self,
        request: Request<Bytes>,
        chain: Chain,
        request_id: Option<String>,
    ) {
        let (parts, body) = request.into_parts();
        self.method = parts.method;
        self.uri = parts.uri;
        self.version = parts.version;
        self.request_headers = parts.headers;
        self.extensions = parts.extensions;
        self.request_body = body;
        self.chain = Some(chain);
        self.cursor = 0;
        self.request_id = request_id;
    }

    /// Execute handlers from the cursor, stopping once a response is written.
    pub(crate) fn run(&mut self) {
        let Some(chain) = self.chain.clone() else {
            return;
        };
        while self.cursor < chain.len() {
            chain[self.cursor].handle(self);
            if self.is_written() {
                self.cursor = chain.len();
                break;
            }
            self.cursor += 1;
        }
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    fn chain_len(&self) -> usize {
        self.chain.as_ref().map_or(0, |c| c.len())
    }

    /// Move the buffered response out; an unwritten status becomes `200 OK`.
    pub(crate) fn take_response(&mut self) -> Response<Body> {
        let mut response = Response::new(Body::from(std::mem::take(&mut self.response_body)));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = std::mem::take(&mut self.response_headers);
        response
    }

    /// Clear every field so the context can serve another request.
    pub(crate) fn reset(&mut self) {
        self.method = Method::GET;
        self.uri = Uri::default();
        self.version = Version::default();
        self.request_headers.clear();
        self.request_body = Bytes::new();
        self.params.clear();
        self.chain = None;
        self.cursor = 0;
        self.status = None;
        self.response_headers.clear();
        self.response_body.clear();
        self.extensions.clear();
        self.request_id = None;
    }
}
