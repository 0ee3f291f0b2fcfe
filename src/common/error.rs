//! Error types for pulse

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Record Errors ===
    #[error("Invalid log record: {0}")]
    InvalidRecord(String),

    // === Publisher Errors ===
    #[error("Publish failed: {0}")]
    Publish(String),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    // === Generic ===
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Is this a failure of the logging path itself (swallowed, never
    /// surfaced on the response path) rather than a startup problem?
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::InvalidRecord(_) | Error::Publish(_))
    }
}

// Implement From for common error types
impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Other(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
