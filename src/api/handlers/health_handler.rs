//! Health check handler.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;

use crate::api::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub services: ServiceHealth,
}

/// Individual dependency status
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub database: &'static str,
}

/// Health check endpoint with storage connectivity check
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.users.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!("Health check failed: {:?}", e);
            "unhealthy"
        }
    };

    let healthy = database == "healthy";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: database,
            services: ServiceHealth { database },
        }),
    )
}
