mod common;

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tsu::middleware::{Pipeline, UsageLogger};
use tsu::{Error, Request, Response, Router, Server};

use common::RecordingLog;

async fn list_items(_req: Request) -> Response {
    Response::json(r#"{"items":[]}"#)
}

/// A port nothing is listening on right now.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn connect(addr: &str) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(addr).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server never started listening on {addr}");
}

#[tokio::test]
async fn malformed_bind_address_is_rejected() {
    let res = Server::bind("not-an-addr").serve(Pipeline::new(Router::new())).await;

    assert!(matches!(res, Err(Error::InvalidAddress(ref addr)) if addr == "not-an-addr"), "{res:?}");
}

#[tokio::test]
async fn served_requests_are_logged_with_the_peer_address() {
    let log = Arc::new(RecordingLog::default());
    let router = Router::new().on(Method::GET, "/api/items", list_items);
    let pipeline = Pipeline::new(router).stage(UsageLogger::new(log.clone()));
    let addr = format!("127.0.0.1:{}", free_port());
    let server = tokio::spawn(Server::bind(addr.clone()).serve(pipeline));

    let mut stream = connect(&addr).await;
    stream
        .write_all(b"GET /api/items HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    server.abort();

    let raw = String::from_utf8_lossy(&raw);
    assert!(raw.starts_with("HTTP/1.1 200"), "{raw}");
    assert!(raw.contains(r#"{"items":[]}"#), "{raw}");
    assert!(
        log.lines().contains(&"GET: http://x/api/items called from 127.0.0.1".to_owned()),
        "{:?}",
        log.lines()
    );
    assert!(log.elapsed().is_some());
}
