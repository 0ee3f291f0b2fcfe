//! Request observability: record model, extraction, capture, publishing,
//! and the middleware tying them together

pub mod capture;
pub mod context;
pub mod extract;
pub mod middleware;
pub mod publisher;
pub mod record;

pub use capture::{BoundedCapture, CaptureBody};
pub use context::current_correlation_id;
pub use extract::resolve_client_addr;
pub use middleware::{request_logging_middleware, RequestLogState, REQUEST_ID_HEADER};
pub use publisher::{LogPublisher, MemoryPublisher, TracingPublisher};
pub use record::{LogRecord, LogRecordBuilder, Severity};
