//! # Health Check Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::ReportingError;
use crate::web::state::AppState;

/// Basic health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Readiness response with the sales database check
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: String,
    pub environment: String,
    pub sales_source: &'static str,
    pub database: DatabaseCheck,
}

#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    /// `healthy`, `not_configured` or `unhealthy`
    pub status: &'static str,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness: GET /health
pub async fn basic_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness: GET /health/ready
///
/// Runs `SELECT 1` against the sales database when one is configured. An
/// unconfigured database is not a readiness failure since the tiles degrade
/// on their own; an unreachable one answers 503.
pub async fn readiness_probe(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    debug!("Performing readiness probe");
    let start = std::time::Instant::now();

    let (status_code, database) = match state.sales_source.ping().await {
        Ok(()) => (
            StatusCode::OK,
            DatabaseCheck {
                status: "healthy",
                duration_ms: start.elapsed().as_millis() as u64,
                message: None,
            },
        ),
        Err(ReportingError::Configuration(message)) => (
            StatusCode::OK,
            DatabaseCheck {
                status: "not_configured",
                duration_ms: 0,
                message: Some(message),
            },
        ),
        Err(err) => {
            error!(error = %err, "Sales database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                DatabaseCheck {
                    status: "unhealthy",
                    duration_ms: start.elapsed().as_millis() as u64,
                    message: Some(err.to_string()),
                },
            )
        }
    };

    let status = if status_code.is_success() {
        "ready"
    } else {
        "not_ready"
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            environment: state.config_manager.environment().to_string(),
            sales_source: state.sales_source.name(),
            database,
        }),
    )
}
