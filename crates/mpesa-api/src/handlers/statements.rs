//! Statement upload and review routes (C6/C7/C11, §4.6/§4.7/§4.11)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use mpesa_types::{LandlordId, MpesaError, StatementId};
use uuid::Uuid;

use crate::dto::{
    StatementDetailResponse, StatementListResponse, StatementSummaryResponse,
    TransactionMatchResponse, UploadStatementRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /api/mpesa/statements`
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadStatementRequest>,
) -> ApiResult<Json<StatementSummaryResponse>> {
    let statement = state
        .ingest
        .ingest(LandlordId(req.landlord_id), req.file_name, &req.raw_text)
        .await?;

    Ok(Json(statement.into()))
}

/// `GET /api/mpesa/statements?landlordId=...`
pub async fn list(
    State(state): State<Arc<AppState>>,
    axum::extract::Query(params): axum::extract::Query<ListStatementsParams>,
) -> ApiResult<Json<StatementListResponse>> {
    let statements = state
        .ingest
        .list_for_landlord(LandlordId(params.landlord_id))
        .await?;

    Ok(Json(StatementListResponse {
        statements: statements.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStatementsParams {
    pub landlord_id: Uuid,
}

/// `GET /api/mpesa/statements/:id`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatementDetailResponse>> {
    let statement_id = StatementId(id);
    let statement = state
        .ingest
        .get(statement_id)
        .await
        .ok_or_else(|| MpesaError::NotFound(format!("statement {id}")))?;

    let matches = state
        .db
        .transaction_match_repo()
        .list_for_statement(statement_id)
        .await
        .map_err(MpesaError::from)?;

    Ok(Json(StatementDetailResponse {
        statement: statement.into(),
        matches: matches
            .into_iter()
            .map(TransactionMatchResponse::from)
            .collect(),
    }))
}

/// `DELETE /api/mpesa/statements/:id`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<crate::dto::SuccessResponse>> {
    state.ingest.delete(StatementId(id)).await?;
    Ok(Json(crate::dto::SuccessResponse::ok()))
}
