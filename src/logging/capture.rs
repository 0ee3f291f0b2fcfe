//! Bounded body capture
//!
//! [`CaptureBody`] tees the data frames of an HTTP body into a
//! [`BoundedCapture`] while passing every byte through unmodified. Retention
//! stops at the configured ceiling; the stream itself is never truncated or
//! altered, so downstream consumers (the handler for request bodies, the
//! client for response bodies) see exactly the original payload.
//!
//! The record's body fields are currently always absent, so nothing reads
//! the captured bytes yet; the wrapper keeps the ceiling contract in place
//! for when they are.

use axum::body::Body;
use bytes::Bytes;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

/// Capped byte accumulator shared between the middleware and a body wrapper.
#[derive(Debug)]
pub struct BoundedCapture {
    buf: Vec<u8>,
    max_bytes: usize,
    total_seen: u64,
}

impl BoundedCapture {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_bytes,
            total_seen: 0,
        }
    }

    pub fn shared(max_bytes: usize) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new(max_bytes)))
    }

    /// Retain up to the ceiling; count everything.
    pub fn extend(&mut self, data: &[u8]) {
        self.total_seen += data.len() as u64;
        let room = self.max_bytes.saturating_sub(self.buf.len());
        if room > 0 {
            let take = room.min(data.len());
            self.buf.extend_from_slice(&data[..take]);
        }
    }

    /// Bytes retained (at most the ceiling).
    pub fn retained(&self) -> &[u8] {
        &self.buf
    }

    /// Total bytes that passed through, retained or not.
    pub fn total_seen(&self) -> u64 {
        self.total_seen
    }

    /// Did the stream exceed the retention ceiling?
    pub fn truncated(&self) -> bool {
        self.total_seen > self.buf.len() as u64
    }
}

/// Pass-through body that tees data frames into a [`BoundedCapture`].
pub struct CaptureBody {
    inner: Body,
    capture: Arc<Mutex<BoundedCapture>>,
}

impl CaptureBody {
    pub fn new(inner: Body, capture: Arc<Mutex<BoundedCapture>>) -> Self {
        Self { inner, capture }
    }

    /// Wrap `body`, returning the wrapped body and the shared capture.
    pub fn wrap(body: Body, max_bytes: usize) -> (Body, Arc<Mutex<BoundedCapture>>) {
        let capture = BoundedCapture::shared(max_bytes);
        let wrapped = Body::new(CaptureBody::new(body, capture.clone()));
        (wrapped, capture)
    }
}

impl http_body::Body for CaptureBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    // Lock poisoning would mean a panic elsewhere mid-extend;
                    // capture is best-effort, the frame still flows through.
                    if let Ok(mut capture) = this.capture.lock() {
                        capture.extend(data);
                    }
                }
                Poll::Ready(Some(Ok(frame)))
            }
            other => other,
        }
    }

    fn is_end_stream(&self) -> bool {
        http_body::Body::is_end_stream(&self.inner)
    }

    fn size_hint(&self) -> http_body::SizeHint {
        http_body::Body::size_hint(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retains_up_to_ceiling() {
        let mut capture = BoundedCapture::new(8);
        capture.extend(b"hello ");
        capture.extend(b"world!");
        assert_eq!(capture.retained(), b"hello wo");
        assert_eq!(capture.total_seen(), 12);
        assert!(capture.truncated());
    }

    #[test]
    fn test_small_payload_fully_retained() {
        let mut capture = BoundedCapture::new(1024);
        capture.extend(b"ping");
        assert_eq!(capture.retained(), b"ping");
        assert!(!capture.truncated());
    }

    #[test]
    fn test_zero_ceiling_retains_nothing() {
        let mut capture = BoundedCapture::new(0);
        capture.extend(b"data");
        assert!(capture.retained().is_empty());
        assert_eq!(capture.total_seen(), 4);
    }

    #[tokio::test]
    async fn test_body_passes_through_unmodified() {
        let payload = vec![7u8; 64 * 1024];
        let (wrapped, capture) = CaptureBody::wrap(Body::from(payload.clone()), 1024);

        let collected = axum::body::to_bytes(wrapped, usize::MAX).await.unwrap();
        assert_eq!(collected.as_ref(), payload.as_slice());

        let capture = capture.lock().unwrap();
        assert_eq!(capture.retained().len(), 1024);
        assert_eq!(capture.total_seen(), 64 * 1024);
        assert!(capture.truncated());
    }
}
