//! # tsu
//!
//! A minimal HTTP framework whose one piece of built-in middleware is a usage
//! logger: every request/response pair that passes through it is written to a
//! log sink with method, decoded URI, caller, content metadata, a bounded body
//! snippet, the failure body when the status is not 2xx, and the latency.
//!
//! ## Pieces
//!
//! - [`Router`] — radix-tree routing via [`matchit`], the end of every pipeline
//! - [`middleware::Pipeline`] — an ordered list of stages built once at startup
//! - [`middleware::UsageLogger`] — the usage log stage
//! - [`log::Log`] — the sink the usage logger writes to; [`log::TracingLog`]
//!   forwards to `tracing`
//! - [`Server`] — hyper, HTTP/1.1 + HTTP/2, graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use http::Method;
//! use tsu::log::TracingLog;
//! use tsu::middleware::{Pipeline, UsageConfig, UsageLogger};
//! use tsu::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tsu::Error> {
//!     let router = Router::new()
//!         .on(Method::GET,  "/users/{id}", get_user)
//!         .on(Method::POST, "/users",      create_user);
//!
//!     let usage = UsageLogger::new(Arc::new(TracingLog))
//!         .with_config(UsageConfig::from_env()?);
//!
//!     Server::bind("0.0.0.0:3000")
//!         .serve(Pipeline::new(router).stage(usage))
//!         .await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     match req.into_body().bytes().await {
//!         Ok(body) => Response::json(body),
//!         Err(_) => Response::status(http::StatusCode::BAD_REQUEST),
//!     }
//! }
//! ```

mod body;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod log;
pub mod middleware;

pub use body::Body;
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
