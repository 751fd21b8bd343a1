//! Minimal tsu example — JSON endpoints behind the usage logger.
//!
//! Run with:
//!   RUST_LOG=info TSU_USAGE_MAX_CONTENT_LENGTH=32 cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/x-www-form-urlencoded' \
//!        -d 'name=alice+smith&note=%7B%22vip%22%3Atrue%7D'
//!   curl http://localhost:3000/fail

use std::sync::Arc;

use http::{Method, StatusCode};
use tracing_subscriber::EnvFilter;
use tsu::log::TracingLog;
use tsu::middleware::{Pipeline, UsageConfig, UsageLogger};
use tsu::{Request, Response, Router, Server};

#[tokio::main]
async fn main() -> Result<(), tsu::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let router = Router::new()
        .on(Method::GET,    "/users/{id}", get_user)
        .on(Method::POST,   "/users",      create_user)
        .on(Method::DELETE, "/users/{id}", delete_user)
        .on(Method::GET,    "/fail",       fail);

    let usage = UsageLogger::new(Arc::new(TracingLog)).with_config(UsageConfig::from_env()?);

    Server::bind("0.0.0.0:3000")
        .serve(Pipeline::new(router).stage(usage))
        .await
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users — the body is still intact after the usage logger read it.
async fn create_user(req: Request) -> Response {
    let body = match req.into_body().bytes().await {
        Ok(body) if !body.is_empty() => body,
        _ => return Response::status(StatusCode::BAD_REQUEST),
    };

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .text(String::from_utf8_lossy(&body))
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /fail — shows up at error level in the usage log.
async fn fail(_req: Request) -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .text("internal error")
}
