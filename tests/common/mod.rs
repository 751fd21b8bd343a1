#![allow(dead_code)]

use std::fmt;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::Frame;
use tsu::log::Log;
use tsu::{Error, Request};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Keeps every record in memory, in arrival order.
#[derive(Default)]
pub struct RecordingLog {
    records: Mutex<Vec<(Level, String)>>,
}

impl RecordingLog {
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records().into_iter().map(|(_, line)| line).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, line)| line)
            .collect()
    }

    /// Seconds reported by the timing line, if it was logged.
    pub fn elapsed(&self) -> Option<f64> {
        self.lines().iter().find_map(|line| {
            line.strip_prefix("Request processing time: ")?
                .strip_suffix('s')?
                .parse()
                .ok()
        })
    }

    fn push(&self, level: Level, args: fmt::Arguments<'_>) {
        self.records.lock().unwrap().push((level, args.to_string()));
    }
}

impl Log for RecordingLog {
    fn info(&self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        self.push(Level::Info, args);
        Ok(())
    }

    fn error(&self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        self.push(Level::Error, args);
        Ok(())
    }
}

/// Rejects every record.
pub struct FailingLog;

impl Log for FailingLog {
    fn info(&self, _args: fmt::Arguments<'_>) -> Result<(), Error> {
        Err(Error::Sink("disk full".into()))
    }

    fn error(&self, _args: fmt::Arguments<'_>) -> Result<(), Error> {
        Err(Error::Sink("disk full".into()))
    }
}

/// A request body whose stream breaks on the first read.
pub struct BrokenBody;

impl http_body::Body for BrokenBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(Some(Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "peer went away",
        ))))
    }
}

pub fn caller() -> SocketAddr {
    "10.0.0.5:52100".parse().unwrap()
}

pub fn get(uri: &str) -> Request {
    Request::from_http(http::Request::get(uri).body(String::new()).unwrap())
        .with_remote_addr(caller())
}

pub fn post(uri: &str, content_type: &str, body: impl Into<String>) -> Request {
    let body = body.into();
    Request::from_http(
        http::Request::post(uri)
            .header("content-type", content_type)
            .header("content-length", body.len())
            .body(body)
            .unwrap(),
    )
    .with_remote_addr(caller())
}
