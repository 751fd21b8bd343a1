//! Unified error type.

use http::StatusCode;

use crate::response::{IntoResponse, Response};

/// The error type returned by tsu's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`] values, not as `Error`s. This type surfaces infrastructure
/// failures and requests a pipeline stage refused to handle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request violates the host contract and was rejected before any
    /// stage observed it.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// A request or response body stream failed while being read. Carries the
    /// message of the underlying transport or stream error.
    #[error("body: {0}")]
    Body(String),

    /// A log sink refused a record.
    #[error("log sink: {0}")]
    Sink(String),

    #[error("config: {0}")]
    Config(String),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that escape the pipeline become a bare status response.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidInput(_) => Response::status(StatusCode::BAD_REQUEST),
            _ => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
