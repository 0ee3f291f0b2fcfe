//! # pulse
//!
//! A thin liveness service wrapped by an exactly-once HTTP request logging
//! middleware:
//! - One structured [`LogRecord`](logging::LogRecord) per non-excluded
//!   request, published on every exit path
//! - Correlation ids scoped to the request future (tokio task-locals), no
//!   cross-request leakage on reused workers
//! - Best-effort field extraction that can never fail the request path
//! - Pluggable publisher: `tracing`-backed in production, capturing stub in
//!   tests
//!
//! ## Architecture
//!
//! ```text
//! inbound request
//!     → skip predicate (monitoring paths pass through uninstrumented)
//!     → correlation id + capture start
//!     → handler chain
//!     → record build → severity classify → publish (exactly once)
//!     → contextual state released
//! ```
//!
//! ## Usage
//!
//! ```bash
//! pulsed serve --bind 0.0.0.0:8080
//! curl localhost:8080/health
//! ```

pub mod common;
pub mod health;
pub mod logging;
pub mod server;

// Re-export commonly used types
pub use common::{Error, LoggingConfig, Result, ServiceConfig};
pub use logging::{LogPublisher, LogRecord, Severity};
pub use server::Server;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
