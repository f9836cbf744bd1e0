//! Response body supporting buffered, streamed and empty modes.
//!
//! - **Buffered**: small files, JSON error and metadata bodies.
//! - **Streaming**: files larger than the buffering threshold, passed through
//!   chunk by chunk from the object store.
//! - **Empty**: `HEAD`, `304` and redirects.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use hipsgate_core::storage::ByteStream;
use http_body::Body;
use http_body_util::Full;

/// Gateway response body.
///
/// Implements [`http_body::Body`] so it can be used directly with hyper responses.
#[derive(Default)]
pub enum GatewayBody {
    /// In-memory content.
    Buffered(Full<Bytes>),
    /// Content streamed from the object store.
    Streaming {
        /// Chunk stream.
        stream: ByteStream,
        /// Bytes still expected.
        remaining: u64,
    },
    /// No content.
    #[default]
    Empty,
}

impl std::fmt::Debug for GatewayBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffered(full) => f.debug_tuple("Buffered").field(full).finish(),
            Self::Streaming { remaining, .. } => f
                .debug_struct("Streaming")
                .field("remaining", remaining)
                .finish(),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

impl GatewayBody {
    /// Create a buffered body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Create a buffered body from a UTF-8 string.
    #[must_use]
    pub fn from_string(s: impl Into<String>) -> Self {
        Self::Buffered(Full::new(Bytes::from(s.into())))
    }

    /// Create a streaming body of `size` bytes.
    #[must_use]
    pub fn streaming(stream: ByteStream, size: u64) -> Self {
        Self::Streaming {
            stream,
            remaining: size,
        }
    }

    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }
}

impl Body for GatewayBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Streaming { stream, remaining } => match stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    *remaining = remaining.saturating_sub(chunk.len() as u64);
                    Poll::Ready(Some(Ok(http_body::Frame::data(chunk))))
                }
                Poll::Ready(Some(Err(err))) => {
                    tracing::error!(error = %err, "object stream failed mid-response");
                    Poll::Ready(Some(Err(std::io::Error::other(err))))
                }
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            },
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Streaming { .. } => false,
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Streaming { remaining, .. } => http_body::SizeHint::with_exact(*remaining),
            Self::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[test]
    fn test_should_report_empty_body_as_end_of_stream() {
        let body = GatewayBody::empty();
        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
    }

    #[test]
    fn test_should_create_buffered_body_from_string() {
        let body = GatewayBody::from_string("hello world");
        assert!(!body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(11));
    }

    #[test]
    fn test_should_default_to_empty() {
        assert!(GatewayBody::default().is_end_stream());
    }

    #[tokio::test]
    async fn test_should_stream_all_chunks() {
        let chunks: Vec<Result<Bytes, hipsgate_core::StoreError>> =
            vec![Ok(Bytes::from_static(b"abc")), Ok(Bytes::from_static(b"de"))];
        let body = GatewayBody::streaming(Box::pin(futures::stream::iter(chunks)), 5);
        assert_eq!(body.size_hint().exact(), Some(5));

        let collected = body.collect().await.expect("collect").to_bytes();
        assert_eq!(&collected[..], b"abcde");
    }

    #[tokio::test]
    async fn test_should_surface_stream_errors() {
        let chunks: Vec<Result<Bytes, hipsgate_core::StoreError>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(hipsgate_core::StoreError::backend(
                "b",
                "k",
                std::io::Error::other("reset"),
            )),
        ];
        let body = GatewayBody::streaming(Box::pin(futures::stream::iter(chunks)), 10);
        assert!(body.collect().await.is_err());
    }
}
