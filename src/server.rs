//! HTTP server assembly

use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::common::{Result, ServiceConfig};
use crate::health;
use crate::logging::{
    request_logging_middleware, LogPublisher, RequestLogState, TracingPublisher,
};

/// The pulse service: a liveness endpoint behind the request logging
/// middleware.
pub struct Server {
    config: ServiceConfig,
    publisher: Arc<dyn LogPublisher>,
}

impl Server {
    /// Server with the production publisher.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_publisher(config, Arc::new(TracingPublisher))
    }

    /// Server with a caller-supplied publisher (tests substitute a
    /// capturing one here).
    pub fn with_publisher(config: ServiceConfig, publisher: Arc<dyn LogPublisher>) -> Self {
        Self { config, publisher }
    }

    /// Build the router. The logging middleware is the outermost layer so
    /// it wraps everything else that runs for a request.
    pub fn router(&self) -> Router {
        let log_state = RequestLogState::new(self.publisher.clone(), self.config.logging.clone());
        Router::new()
            .route("/health", get(health::health))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(
                log_state,
                request_logging_middleware,
            ))
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting pulse v{}", crate::VERSION);
        tracing::info!("  HTTP API: {}", self.config.bind_addr);
        tracing::info!("  Skip prefixes: {:?}", self.config.logging.skip_prefixes);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();

        tracing::info!("✓ pulse ready");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
    } else {
        tracing::info!("Shutdown signal received");
    }
}
