//! The structured log record built once per completed HTTP exchange
//!
//! A [`LogRecord`] is immutable after construction: the middleware builds it
//! at the end of request processing and hands ownership to the publisher.
//! Required fields are enforced by [`LogRecordBuilder::build`]; status code,
//! client address, and headers are best-effort and accepted as-is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::common::{Error, Result};

/// Severity a record is logged at, derived purely from the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Classify a status code. Total over all integers: anything below 400
    /// (including 0 and negatives) is `Info`, anything at or above 500
    /// (including out-of-range codes like 600) is `Error`.
    pub fn classify(status: i32) -> Severity {
        if status >= 500 {
            Severity::Error
        } else if status >= 400 {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}

/// Immutable record of one completed HTTP exchange.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Per-request id, collision-resistant within a process
    pub correlation_id: String,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// No range invariant: whatever the response carried (499 for aborted
    /// requests that never produced one)
    pub status: i32,
    pub duration_ms: i64,
    /// Best-effort resolved client address, may be empty
    pub client_addr: String,
    pub user_agent: Option<String>,
    /// Snapshot taken at capture time. Names are as the http crate exposes
    /// them (lowercased); values are rendered lossily if not UTF-8.
    pub headers: BTreeMap<String, String>,
    /// Reserved for future capture, currently always `None`
    pub request_body: Option<String>,
    /// Reserved for future capture, currently always `None`
    pub response_body: Option<String>,
    /// Request-start time
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn builder() -> LogRecordBuilder {
        LogRecordBuilder::default()
    }

    /// Severity this record should be logged at.
    pub fn severity(&self) -> Severity {
        Severity::classify(self.status)
    }
}

/// Builder for [`LogRecord`]; `build()` enforces the construction invariants.
#[derive(Debug, Default)]
pub struct LogRecordBuilder {
    correlation_id: Option<String>,
    method: Option<String>,
    path: Option<String>,
    query: Option<String>,
    status: i32,
    duration_ms: i64,
    client_addr: String,
    user_agent: Option<String>,
    headers: BTreeMap<String, String>,
    request_body: Option<String>,
    response_body: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl LogRecordBuilder {
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    pub fn status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    pub fn duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn client_addr(mut self, addr: impl Into<String>) -> Self {
        self.client_addr = addr.into();
        self
    }

    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn request_body(mut self, body: Option<String>) -> Self {
        self.request_body = body;
        self
    }

    pub fn response_body(mut self, body: Option<String>) -> Self {
        self.response_body = body;
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validate and construct the record. The middleware builds every
    /// required field itself, so a failure here is a programming error in
    /// the logging path, not a user-facing condition.
    pub fn build(self) -> Result<LogRecord> {
        let correlation_id = match self.correlation_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(Error::InvalidRecord(
                    "correlation_id cannot be blank".to_string(),
                ))
            }
        };
        let method = match self.method {
            Some(m) if !m.trim().is_empty() => m,
            _ => return Err(Error::InvalidRecord("method cannot be blank".to_string())),
        };
        let path = match self.path {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(Error::InvalidRecord("path cannot be blank".to_string())),
        };
        if self.duration_ms < 0 {
            return Err(Error::InvalidRecord(format!(
                "duration_ms cannot be negative: {}",
                self.duration_ms
            )));
        }
        let timestamp = self
            .timestamp
            .ok_or_else(|| Error::InvalidRecord("timestamp is required".to_string()))?;

        Ok(LogRecord {
            correlation_id,
            method,
            path,
            query: self.query,
            status: self.status,
            duration_ms: self.duration_ms,
            client_addr: self.client_addr,
            user_agent: self.user_agent,
            headers: self.headers,
            request_body: self.request_body,
            response_body: self.response_body,
            timestamp,
        })
    }
}
