//! Inbound Daraja callback routes (C9, §4.9)
//!
//! Always acknowledges with the dispatcher's own status/body — Daraja
//! retries on anything other than a 200, so even a rejected envelope
//! still has to answer with an HTTP status the dispatcher chose, not a
//! framework-level error page.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mpesa_callback::DispatchStatus;

use crate::state::AppState;

fn status_for(status: DispatchStatus) -> StatusCode {
    match status {
        DispatchStatus::Accepted => StatusCode::OK,
        DispatchStatus::BadRequest => StatusCode::BAD_REQUEST,
    }
}

/// `POST /api/daraja/callback`
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let outcome = state.callback.handle_result(raw).await;
    (status_for(outcome.status), Json(outcome.body))
}

/// `POST /api/daraja/timeout`
pub async fn timeout(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let outcome = state.callback.handle_timeout(raw).await;
    (status_for(outcome.status), Json(outcome.body))
}
