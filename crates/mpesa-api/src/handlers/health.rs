//! Liveness/readiness endpoints
//!
//! Not part of the external interface table (§6), but ambient ops
//! surface every service in this workspace carries, mirroring the
//! teacher's health handler shape.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
}

pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    match state.db.health_check().await {
        Ok(health) if health.healthy => {
            (StatusCode::OK, Json(ReadinessResponse { ready: true }))
        }
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse { ready: false }),
        ),
    }
}
