//! Receipt retrieval (C12, §4.12)
//!
//! PDF rendering is out of scope (`ReceiptSink` only models delivery to an
//! external renderer), so this returns the assembled receipt record as
//! JSON rather than a streamed document.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use mpesa_types::{MpesaError, PaymentHistoryId};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/payments/:paymentId/receipt`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> ApiResult<Json<mpesa_types::Receipt>> {
    let history = state
        .db
        .payment_history_repo()
        .find(PaymentHistoryId(payment_id))
        .await
        .map_err(MpesaError::from)?
        .ok_or_else(|| MpesaError::NotFound(format!("payment {payment_id}")))?;

    let receipt = state.receipts.assemble(&history)?;
    Ok(Json(receipt))
}
