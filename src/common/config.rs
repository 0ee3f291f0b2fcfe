//! Configuration for the pulse service

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::common::{Error, Result};

/// Global service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind address for the HTTP server
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Logging level filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request logging middleware config
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Request logging middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Path prefixes that are never instrumented (the service's own
    /// monitoring endpoints, typically)
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,

    /// Maximum number of body bytes retained for inspection. Bytes beyond
    /// the ceiling still pass through untouched. 0 disables body wrapping.
    #[serde(default = "default_max_capture_bytes")]
    pub max_capture_bytes: usize,
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("static default bind addr")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_skip_prefixes() -> Vec<String> {
    vec!["/health".to_string()]
}

fn default_max_capture_bytes() -> usize {
    10_000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            log_level: default_log_level(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: default_skip_prefixes(),
            max_capture_bytes: default_max_capture_bytes(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional TOML file plus `PULSE_`-prefixed
    /// environment variables (env wins over file, defaults fill the rest).
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("pulse").required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("PULSE").separator("__"))
            .build()?;
        let cfg: ServiceConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configs that would misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        for prefix in &self.logging.skip_prefixes {
            if !prefix.starts_with('/') {
                return Err(Error::InvalidConfig(format!(
                    "skip prefix must start with '/': {}",
                    prefix
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.logging.skip_prefixes, vec!["/health"]);
        assert_eq!(cfg.logging.max_capture_bytes, 10_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pulse.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
bind_addr = "127.0.0.1:9999"

[logging]
skip_prefixes = ["/health", "/internal"]
max_capture_bytes = 512
"#
        )
        .unwrap();

        let cfg = ServiceConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.bind_addr.port(), 9999);
        assert_eq!(cfg.logging.skip_prefixes.len(), 2);
        assert_eq!(cfg.logging.max_capture_bytes, 512);
        // Defaults still fill unspecified fields
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_bad_skip_prefix_rejected() {
        let cfg = ServiceConfig {
            logging: LoggingConfig {
                skip_prefixes: vec!["health".to_string()],
                ..LoggingConfig::default()
            },
            ..ServiceConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
