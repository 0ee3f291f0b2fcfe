//! Liveness endpoint
//!
//! Reports success independent of logging status: nothing in the logging
//! subsystem can make this endpoint fail.

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Payload returned by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn alive() -> Self {
        Self {
            message: "I'm alive!".to_string(),
            version: crate::VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Liveness probe: if we can respond, we're alive.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::alive()))
}
