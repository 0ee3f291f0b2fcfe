//! Common utilities and types shared across pulse

pub mod config;
pub mod error;

pub use config::{LoggingConfig, ServiceConfig};
pub use error::{Error, Result};
