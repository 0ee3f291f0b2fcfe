//! Request logging middleware
//!
//! Wraps the handler chain so that exactly one [`LogRecord`] is published
//! per non-excluded request, whichever way the request finishes:
//!
//! - normal completion and handler error responses publish with the
//!   response status after `next.run` returns;
//! - a cancelled or panicked request future publishes from the guard's
//!   `Drop` with status 499 (client-closed-request convention).
//!
//! Nothing in here may fail the request path: extraction helpers are total,
//! record-validation and publish failures are logged and swallowed, and the
//! correlation-id scope is released on every exit path.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::common::LoggingConfig;
use crate::logging::capture::CaptureBody;
use crate::logging::context;
use crate::logging::extract::{resolve_client_addr, snapshot_headers, user_agent, FORWARDED_FOR};
use crate::logging::publisher::LogPublisher;
use crate::logging::record::LogRecord;

/// Header carrying the correlation id back to the client.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Status recorded when the request future is dropped before a response
/// exists (client disconnect, timeout cancellation, handler panic).
const STATUS_ABORTED: i32 = 499;

/// State for the logging middleware.
#[derive(Clone)]
pub struct RequestLogState {
    pub publisher: Arc<dyn LogPublisher>,
    pub config: LoggingConfig,
}

impl RequestLogState {
    pub fn new(publisher: Arc<dyn LogPublisher>, config: LoggingConfig) -> Self {
        Self { publisher, config }
    }

    /// Should this path skip instrumentation entirely?
    fn is_excluded(&self, path: &str) -> bool {
        self.config
            .skip_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }
}

/// Request logging middleware. Install with
/// `axum::middleware::from_fn_with_state`.
pub async fn request_logging_middleware(
    State(state): State<RequestLogState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Exclusion predicate runs before any capture work
    if state.is_excluded(request.uri().path()) {
        return next.run(request).await;
    }

    let started = Instant::now();
    let timestamp = Utc::now();
    let correlation_id = Uuid::new_v4().to_string();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    // Peer address is best-effort: absent when the router is driven without
    // connect info (tests, in-process calls)
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string());
    let forwarded = request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let client_addr = resolve_client_addr(forwarded.as_deref(), peer.as_deref());
    let agent = user_agent(request.headers());
    let headers = snapshot_headers(request.headers());

    // Bounded tee on the request body; the handler still sees every byte
    let request = if state.config.max_capture_bytes > 0 {
        let (parts, body) = request.into_parts();
        let (body, _request_capture) = CaptureBody::wrap(body, state.config.max_capture_bytes);
        Request::from_parts(parts, body)
    } else {
        request
    };

    let span = tracing::info_span!(
        "request",
        correlation_id = %correlation_id,
        method = %method,
        path = %path,
    );

    let pending = PendingRecord {
        correlation_id: correlation_id.clone(),
        method,
        path,
        query,
        client_addr,
        user_agent: agent,
        headers,
        timestamp,
        started,
    };
    let max_capture_bytes = state.config.max_capture_bytes;
    let publisher = state.publisher;

    // The publish attempt happens inside the scope so the contextual state
    // is released strictly after it, and the guard's Drop covers the exit
    // paths where `next.run` never returns.
    context::scope(
        correlation_id,
        async move {
            let mut guard = PublishGuard::new(publisher, pending);

            let response = next.run(request).await;

            let status = i32::from(response.status().as_u16());
            let mut response = if max_capture_bytes > 0 {
                let (parts, body) = response.into_parts();
                let (body, _response_capture) = CaptureBody::wrap(body, max_capture_bytes);
                Response::from_parts(parts, body)
            } else {
                response
            };

            if let Ok(value) = HeaderValue::from_str(&guard.correlation_id()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            guard.finish(status);
            response
        }
        .instrument(span),
    )
    .await
}

/// Everything accumulated before downstream dispatch.
struct PendingRecord {
    correlation_id: String,
    method: String,
    path: String,
    query: Option<String>,
    client_addr: String,
    user_agent: Option<String>,
    headers: BTreeMap<String, String>,
    timestamp: DateTime<Utc>,
    started: Instant,
}

/// Publishes exactly once: either explicitly via [`finish`] with the real
/// response status, or from `Drop` with [`STATUS_ABORTED`] when the request
/// future never completed.
///
/// [`finish`]: PublishGuard::finish
struct PublishGuard {
    publisher: Arc<dyn LogPublisher>,
    pending: Option<PendingRecord>,
}

impl PublishGuard {
    fn new(publisher: Arc<dyn LogPublisher>, pending: PendingRecord) -> Self {
        Self {
            publisher,
            pending: Some(pending),
        }
    }

    fn correlation_id(&self) -> String {
        self.pending
            .as_ref()
            .map(|p| p.correlation_id.clone())
            .unwrap_or_default()
    }

    fn finish(&mut self, status: i32) {
        if let Some(pending) = self.pending.take() {
            publish_record(&*self.publisher, pending, status);
        }
    }
}

impl Drop for PublishGuard {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            publish_record(&*self.publisher, pending, STATUS_ABORTED);
        }
    }
}

/// Build the record and hand it to the publisher. Both steps are
/// best-effort: failures are logged and swallowed, never surfaced on the
/// response path.
fn publish_record(publisher: &dyn LogPublisher, pending: PendingRecord, status: i32) {
    let duration_ms = pending.started.elapsed().as_millis().min(i64::MAX as u128) as i64;

    let record = LogRecord::builder()
        .correlation_id(pending.correlation_id)
        .method(pending.method)
        .path(pending.path)
        .query(pending.query)
        .status(status)
        .duration_ms(duration_ms)
        .client_addr(pending.client_addr)
        .user_agent(pending.user_agent)
        .headers(pending.headers)
        .timestamp(pending.timestamp)
        .build();

    match record {
        Ok(record) => {
            if let Err(e) = publisher.publish(record) {
                tracing::warn!(error = %e, "log publish failed, record dropped");
            }
        }
        // The middleware fills every required field itself, so this is a
        // contract violation inside the logging path
        Err(e) => tracing::error!(error = %e, "log record construction failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Result;
    use crate::logging::publisher::MemoryPublisher;

    struct FailingPublisher;

    impl LogPublisher for FailingPublisher {
        fn publish(&self, _record: LogRecord) -> Result<()> {
            Err(crate::common::Error::Publish("sink unavailable".into()))
        }
    }

    fn pending() -> PendingRecord {
        PendingRecord {
            correlation_id: "cid-1".to_string(),
            method: "GET".to_string(),
            path: "/x".to_string(),
            query: None,
            client_addr: "10.0.0.1".to_string(),
            user_agent: None,
            headers: BTreeMap::new(),
            timestamp: Utc::now(),
            started: Instant::now(),
        }
    }

    #[test]
    fn test_guard_publishes_once_on_finish() {
        let publisher = Arc::new(MemoryPublisher::new());
        let mut guard = PublishGuard::new(publisher.clone(), pending());
        guard.finish(200);
        drop(guard);

        let records = publisher.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, 200);
    }

    #[test]
    fn test_guard_publishes_aborted_on_drop() {
        let publisher = Arc::new(MemoryPublisher::new());
        let guard = PublishGuard::new(publisher.clone(), pending());
        drop(guard);

        let records = publisher.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, STATUS_ABORTED);
    }

    #[test]
    fn test_publish_failure_is_swallowed() {
        // Must not panic or propagate
        publish_record(&FailingPublisher, pending(), 200);
    }

    #[test]
    fn test_exclusion_predicate() {
        let state = RequestLogState::new(
            Arc::new(MemoryPublisher::new()),
            LoggingConfig {
                skip_prefixes: vec!["/health".to_string(), "/internal".to_string()],
                max_capture_bytes: 0,
            },
        );
        assert!(state.is_excluded("/health"));
        assert!(state.is_excluded("/health/live"));
        assert!(state.is_excluded("/internal/metrics"));
        assert!(!state.is_excluded("/api/users"));
        assert!(!state.is_excluded("/"));
    }
}
