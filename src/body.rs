//! Type-erased HTTP body shared by requests and responses.
//!
//! Incoming hyper bodies, buffered byte payloads and handler output all end up
//! behind the same [`Body`] type so middleware can drain a body once and hand
//! an equivalent one to the next stage.

use std::error::Error as StdError;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};

use crate::error::Error;

/// A streaming body that can be read at most once.
pub struct Body(UnsyncBoxBody<Bytes, Error>);

impl Body {
    /// Wraps any `http_body::Body` producing [`Bytes`] frames.
    ///
    /// Whatever error the stream produces surfaces as [`Error::Body`].
    pub fn new<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self(body.map_err(|e| Error::Body(e.into().to_string())).boxed_unsync())
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    /// A body whose first poll yields `err`.
    ///
    /// Lets a stream failure reach the next reader after the failed stream
    /// itself has been consumed.
    pub(crate) fn failed(err: Error) -> Self {
        Self(Failed(Some(err)).boxed_unsync())
    }

    /// Drains every data frame into one contiguous buffer.
    pub async fn bytes(self) -> Result<Bytes, Error> {
        Ok(self.0.collect().await?.to_bytes())
    }
}

impl Default for Body {
    fn default() -> Self { Self::empty() }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("size_hint", &self.0.size_hint())
            .finish_non_exhaustive()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self { Self::new(Full::new(bytes)) }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self { Self::from(Bytes::from(bytes)) }
}

impl From<String> for Body {
    fn from(text: String) -> Self { Self::from(Bytes::from(text)) }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self { Self::from(Bytes::from_static(text.as_bytes())) }
}

impl HttpBody for Body {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.0).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.0.size_hint()
    }
}

struct Failed(Option<Error>);

impl HttpBody for Failed {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.0.take().map(Err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_buffered_bytes() {
        let body = Body::from("hello");
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn empty_body_collects_to_nothing() {
        assert!(Body::empty().bytes().await.unwrap().is_empty());
    }

    struct Reset;

    impl HttpBody for Reset {
        type Data = Bytes;
        type Error = std::io::Error;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
            let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer went away");
            Poll::Ready(Some(Err(err)))
        }
    }

    #[tokio::test]
    async fn stream_errors_become_body_errors() {
        let err = Body::new(Reset).bytes().await.unwrap_err();
        assert!(matches!(&err, Error::Body(msg) if msg == "peer went away"), "{err:?}");
    }

    #[tokio::test]
    async fn failed_body_replays_the_error() {
        let body = Body::failed(Error::Body("connection reset".into()));
        let err = body.bytes().await.unwrap_err();
        assert_eq!(err.to_string(), "body: connection reset");
    }
}
