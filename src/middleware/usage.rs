//! Request/response usage logging.
//!
//! [`UsageLogger`] writes a short, human-readable account of every request it
//! sees to an injected [`Log`] sink:
//!
//! ```text
//! POST: http://api.local/api/items called from 10.0.0.5
//! Content-Type: application/json, Content-Length: 17
//! Accept-Encoding: gzip, Accept-Charset: , Accept-Language: en-US
//! Data: {"a"
//! Request processing time: 0.001734s
//! ```
//!
//! The request body is drained once, decoded for the `Data:` line and put back
//! as a buffered body, so the handler receives exactly the bytes the client
//! sent. The response body is only read when the status is not 2xx; it is
//! logged at error level and put back the same way.
//!
//! Logging never changes what the client receives. Sink failures and bodies
//! that cannot be read or decoded are reported through `tracing::warn!` and
//! the request carries on.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use std::{env, fmt};

use http::HeaderMap;
use http::header::{
    ACCEPT_CHARSET, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, HOST,
    HeaderName,
};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use tracing::warn;

use crate::body::Body;
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::log::Log;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Settings for [`UsageLogger`], fixed once the logger is built.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UsageConfig {
    /// Upper bound on the decoded request body logged in the `Data:` line.
    /// `0` logs the whole body. Above the bound, the first
    /// `max_content_length - 1` characters are logged.
    pub max_content_length: usize,
}

impl UsageConfig {
    pub const MAX_CONTENT_LENGTH_VAR: &'static str = "TSU_USAGE_MAX_CONTENT_LENGTH";

    /// Reads `TSU_USAGE_MAX_CONTENT_LENGTH`, defaulting to `0`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        Ok(Self {
            max_content_length: parse_var(&lookup, Self::MAX_CONTENT_LENGTH_VAR, "0")?,
        })
    }

    /// The part of a decoded body that goes into the `Data:` line.
    pub fn snippet<'a>(&self, body: &'a str) -> &'a str {
        let max = self.max_content_length;
        if max == 0 || body.chars().count() <= max {
            return body;
        }
        match body.char_indices().nth(max - 1) {
            Some((end, _)) => &body[..end],
            None => body,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, Error>
where
    T: FromStr,
{
    lookup(key)
        .as_deref()
        .unwrap_or(default)
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid {key}")))
}

/// Middleware that logs every request/response pair passing through it.
///
/// Cloning is cheap: the sink is shared and the config is copied.
#[derive(Clone)]
pub struct UsageLogger {
    config: UsageConfig,
    log: Arc<dyn Log>,
}

impl UsageLogger {
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self { config: UsageConfig::default(), log }
    }

    pub fn with_config(mut self, config: UsageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_content_length(mut self, max: usize) -> Self {
        self.config.max_content_length = max;
        self
    }

    pub fn config(&self) -> UsageConfig {
        self.config
    }

    /// Logs `req`, forwards it to `next`, logs the outcome and returns the
    /// response untouched.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if the request has no caller address, before
    /// anything is logged. Errors returned by `next` are passed through.
    pub async fn intercept(&self, mut req: Request, next: Next) -> Result<Response, Error> {
        let Some(caller) = req.remote_addr() else {
            return Err(Error::InvalidInput("request carries no caller address"));
        };
        let start = Instant::now();

        let data = match req.take_body().bytes().await {
            Ok(bytes) => {
                let text = decode_body(&bytes);
                req.set_body(bytes);
                text
            }
            Err(e) => {
                warn!(error = %e, "usage: request body could not be read");
                req.set_body(Body::failed(e));
                None
            }
        };

        let headers = req.headers();
        self.info(format_args!(
            "{}: {} called from {}",
            req.method(),
            url_decode(&absolute_uri(&req)),
            caller.ip(),
        ));
        self.info(format_args!(
            "Content-Type: {}, Content-Length: {}",
            media_type(headers),
            header_list(headers, &CONTENT_LENGTH),
        ));
        self.info(format_args!(
            "Accept-Encoding: {}, Accept-Charset: {}, Accept-Language: {}",
            header_list(headers, &ACCEPT_ENCODING),
            header_list(headers, &ACCEPT_CHARSET),
            header_list(headers, &ACCEPT_LANGUAGE),
        ));
        if let Some(data) = data.as_deref().filter(|d| !d.is_empty()) {
            self.info(format_args!("Data: {}", self.config.snippet(data)));
        }

        let mut response = match next.run(req).await {
            Ok(response) => response,
            Err(e) => {
                self.log_elapsed(start);
                return Err(e);
            }
        };

        if !response.is_success() {
            match response.take_body().bytes().await {
                Ok(bytes) => {
                    self.error(format_args!("{}", String::from_utf8_lossy(&bytes)));
                    response.set_body(bytes);
                }
                Err(e) => {
                    warn!(error = %e, status = %response.status_code(), "usage: response body could not be read");
                    response.set_body(Body::failed(e));
                }
            }
        }

        self.log_elapsed(start);
        Ok(response)
    }

    fn log_elapsed(&self, start: Instant) {
        self.info(format_args!(
            "Request processing time: {}s",
            start.elapsed().as_secs_f64()
        ));
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.log.info(args) {
            warn!(error = %e, "usage: log sink rejected an info record");
        }
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.log.error(args) {
            warn!(error = %e, "usage: log sink rejected an error record");
        }
    }
}

impl fmt::Debug for UsageLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageLogger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Middleware for UsageLogger {
    fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>> {
        let this = self.clone();
        Box::pin(async move { this.intercept(req, next).await })
    }
}

/// UTF-8 then URL-decodes a request body. Non-UTF-8 bodies are not logged.
fn decode_body(bytes: &[u8]) -> Option<String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(url_decode(text)),
        Err(e) => {
            warn!(error = %e, len = bytes.len(), "usage: request body is not valid UTF-8");
            None
        }
    }
}

/// URL decoding as applied to form bodies: `+` is a space, `%XX` is a byte.
/// Byte sequences that do not form UTF-8 become U+FFFD.
fn url_decode(input: &str) -> String {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// The request target in absolute form. Origin-form targets are completed
/// from the `Host` header when one is present.
fn absolute_uri(req: &Request) -> String {
    let uri = req.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    match req.headers().get(HOST).and_then(|v| v.to_str().ok()) {
        Some(host) => format!("http://{host}{target}"),
        None => target.to_owned(),
    }
}

/// `Content-Type` without parameters, or empty.
fn media_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map_or("", str::trim)
}

/// Every value of `name`, joined with `", "`.
fn header_list(headers: &HeaderMap, name: &HeaderName) -> String {
    headers
        .get_all(name)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .collect::<Vec<_>>()
        .join(", ")
}
