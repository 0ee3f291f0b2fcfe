//! Log record publishers
//!
//! The middleware's single outward call is `publish(record)`. Ownership of
//! the record transfers at the call; implementations may retain or discard
//! it, must be callable concurrently from in-flight requests, and get no
//! ordering guarantee between calls.

use std::sync::Mutex;
use tracing::{error, info, warn};

use crate::common::Result;
use crate::logging::record::{LogRecord, Severity};

/// Sink for finished log records.
pub trait LogPublisher: Send + Sync {
    /// Consume one record. A returned error is best-effort information for
    /// the caller; the middleware swallows it and never retries.
    fn publish(&self, record: LogRecord) -> Result<()>;
}

/// Production publisher: one structured tracing event per record, emitted at
/// the record's classified severity.
#[derive(Debug, Default, Clone)]
pub struct TracingPublisher;

impl LogPublisher for TracingPublisher {
    fn publish(&self, record: LogRecord) -> Result<()> {
        let message = format!(
            "HTTP {} {} - Status: {} - Duration: {}ms",
            record.method, record.path, record.status, record.duration_ms
        );
        match record.severity() {
            Severity::Error => error!(
                correlation_id = %record.correlation_id,
                method = %record.method,
                path = %record.path,
                query = record.query.as_deref(),
                status = record.status,
                duration_ms = record.duration_ms,
                client_addr = %record.client_addr,
                user_agent = record.user_agent.as_deref(),
                "{message}"
            ),
            Severity::Warning => warn!(
                correlation_id = %record.correlation_id,
                method = %record.method,
                path = %record.path,
                query = record.query.as_deref(),
                status = record.status,
                duration_ms = record.duration_ms,
                client_addr = %record.client_addr,
                user_agent = record.user_agent.as_deref(),
                "{message}"
            ),
            Severity::Info => info!(
                correlation_id = %record.correlation_id,
                method = %record.method,
                path = %record.path,
                query = record.query.as_deref(),
                status = record.status,
                duration_ms = record.duration_ms,
                client_addr = %record.client_addr,
                user_agent = record.user_agent.as_deref(),
                "{message}"
            ),
        }
        Ok(())
    }
}

/// Capturing publisher for tests and diagnostics: appends every record to an
/// in-memory list.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogPublisher for MemoryPublisher {
    fn publish(&self, record: LogRecord) -> Result<()> {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
        Ok(())
    }
}
