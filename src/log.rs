//! Log sinks for middleware that emits human-readable records.
//!
//! Middleware receives an already-built sink as `Arc<dyn Log>` and never
//! configures destinations or formats itself. [`TracingLog`] forwards to the
//! `tracing` macros, so whatever subscriber the application installed decides
//! where the lines go.

use std::fmt;

use crate::error::Error;

/// A sink accepting info and error records.
///
/// Sinks are shared by every in-flight request and must tolerate concurrent
/// calls. A sink that cannot accept a record returns `Err`; callers treat that
/// as best-effort and carry on.
pub trait Log: Send + Sync + 'static {
    fn info(&self, args: fmt::Arguments<'_>) -> Result<(), Error>;
    fn error(&self, args: fmt::Arguments<'_>) -> Result<(), Error>;
}

/// Forwards records to `tracing` under the `tsu::usage` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl Log for TracingLog {
    fn info(&self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        tracing::info!(target: "tsu::usage", "{args}");
        Ok(())
    }

    fn error(&self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        tracing::error!(target: "tsu::usage", "{args}");
        Ok(())
    }
}
