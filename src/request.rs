//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use http::{HeaderMap, Method, Uri};

use crate::body::Body;

/// An incoming HTTP request.
///
/// The server attaches the address of the TCP peer to every request it
/// accepts. Requests built by hand (tests, in-process callers) attach it with
/// [`Request::with_remote_addr`].
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
    pub(crate) remote_addr: Option<SocketAddr>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// Converts an `http::Request` with any compatible body type.
    pub fn from_http<B>(req: http::Request<B>) -> Self
    where
        B: http_body::Body<Data = bytes::Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: Body::new(body),
            remote_addr: None,
            params: HashMap::new(),
        }
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// Address of the caller, if the host attached one.
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// First value of a header, if present and valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Moves the body out, leaving an empty one in its place.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
    }

    pub fn into_body(self) -> Body {
        self.body
    }
}
