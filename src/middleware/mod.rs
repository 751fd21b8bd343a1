//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: request logging, metrics, authentication-header
//! inspection. A stage is a value that turns `(Request, Next)` into a
//! response; [`Next`] is the rest of the chain.
//!
//! Stages are composed explicitly, once, at startup:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use http::Method;
//! use tsu::log::TracingLog;
//! use tsu::middleware::{Pipeline, UsageLogger};
//! use tsu::{Request, Response, Router};
//!
//! # async fn hello(_: Request) -> Response { Response::text("hi") }
//! let router = Router::new().on(Method::GET, "/", hello);
//! let pipeline = Pipeline::new(router)
//!     .stage(UsageLogger::new(Arc::new(TracingLog)).max_content_length(256));
//! ```
//!
//! Built-in middleware:
//! - [`usage`] — per-request usage log with method, decoded URI, caller,
//!   content metadata, body snippet, failure body and latency

use std::future::Future;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

pub mod usage;

pub use usage::{UsageConfig, UsageLogger};

/// A pipeline stage.
///
/// Implementations call `next.run(req)` to continue the chain, or return
/// without calling it to answer the request themselves. An `Err` travels back
/// through the outer stages to the server, which turns it into a response.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>>;
}

/// Adapts an async function into a [`Middleware`].
///
/// ```rust
/// use tsu::middleware::{from_fn, Next};
/// use tsu::{Error, Request, Response};
///
/// async fn passthrough(req: Request, next: Next) -> Result<Response, Error> {
///     next.run(req).await
/// }
///
/// let stage = from_fn(passthrough);
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    FromFn(f)
}

/// See [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>> {
        Box::pin((self.0)(req, next))
    }
}

type Stages = Arc<[Arc<dyn Middleware>]>;

/// The remainder of the pipeline after the current stage.
#[derive(Clone)]
pub struct Next {
    stages: Stages,
    router: Arc<Router>,
    index: usize,
}

impl Next {
    /// Hands `req` to the next stage, or to the router once every stage has run.
    pub fn run(self, req: Request) -> BoxFuture<Result<Response, Error>> {
        let stage = self.stages.get(self.index).cloned();
        match stage {
            Some(stage) => {
                let next = Next { index: self.index + 1, ..self };
                stage.call(req, next)
            }
            None => {
                let fut = self.router.dispatch(req);
                Box::pin(async move { Ok(fut.await) })
            }
        }
    }
}

/// An ordered list of stages in front of a [`Router`].
///
/// The first stage added is the outermost: it sees the request first and the
/// response last. Cloning is cheap; every clone shares the same stages.
#[derive(Clone)]
pub struct Pipeline {
    stages: Stages,
    router: Arc<Router>,
}

impl Pipeline {
    pub fn new(router: Router) -> Self {
        Self { stages: Vec::new().into(), router: Arc::new(router) }
    }

    /// Appends a stage inside every stage added so far.
    pub fn stage(mut self, stage: impl Middleware) -> Self {
        let mut stages = self.stages.to_vec();
        stages.push(Arc::new(stage));
        self.stages = stages.into();
        self
    }

    /// Runs one request through every stage and the router.
    pub fn handle(&self, req: Request) -> BoxFuture<Result<Response, Error>> {
        Next {
            stages: Arc::clone(&self.stages),
            router: Arc::clone(&self.router),
            index: 0,
        }
        .run(req)
    }
}
