//! Match review routes (C10, §4.10)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use mpesa_types::{MatchId, TenantId};
use uuid::Uuid;

use crate::dto::{ApproveMatchRequest, ManualMatchRequest, RejectMatchRequest, TransactionMatchResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /api/mpesa/matches/:id/approve`
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveMatchRequest>,
) -> ApiResult<Json<TransactionMatchResponse>> {
    let result = state.review.approve(MatchId(id), req.notes).await?;
    Ok(Json(result.into()))
}

/// `POST /api/mpesa/matches/:id/reject`
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectMatchRequest>,
) -> ApiResult<Json<TransactionMatchResponse>> {
    let result = state.review.reject(MatchId(id), req.notes).await?;
    Ok(Json(result.into()))
}

/// `POST /api/mpesa/matches/:id/manual-match`
pub async fn manual_match(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ManualMatchRequest>,
) -> ApiResult<Json<TransactionMatchResponse>> {
    let result = state
        .review
        .manual_match(MatchId(id), TenantId(req.tenant_id))
        .await?;
    Ok(Json(result.into()))
}
