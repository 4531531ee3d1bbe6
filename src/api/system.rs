//! System endpoints: status and health probes.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub database: bool,
}

/// `GET /api/system/status`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let film_count = state.films().list_films().await?.len();
    let user_count = state.users().list_users().await?.len();

    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        backend: state.shared.backend_name.to_string(),
        film_count,
        user_count,
    };
    Ok(Json(ApiResponse::success(status)))
}

/// `GET /api/system/health/live`
///
/// Lightweight liveness probe to indicate the process is running.
pub async fn health_live() -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse { status: "alive" }))
}

/// `GET /api/system/health/ready`
///
/// Readiness probe; with the SQLite backend this also checks the
/// database connection.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let database = match state.shared.store.as_ref() {
        Some(store) => store.ping().await.is_ok(),
        None => true,
    };

    let body = ApiResponse::success(HealthReadyResponse {
        ready: database,
        database,
    });

    if database {
        Json(body).into_response()
    } else {
        (axum::http::StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}
