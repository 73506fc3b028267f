//! STK Push initiation and status polling (C4/C5/C8, §4.4/§4.5/§4.8)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use mpesa_types::{
    CheckoutRequestId, IntentId, IntentStatus, LandlordId, MpesaError, PaymentIntent, TenantId,
    INTENT_TTL_SECS,
};
use uuid::Uuid;

use crate::dto::{IntentSnapshot, StkInitiateRequest, StkInitiateResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `POST /api/payments/stk`
pub async fn initiate_stk(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StkInitiateRequest>,
) -> ApiResult<Json<StkInitiateResponse>> {
    let phone = mpesa_core::normalize(&req.phone)
        .ok_or_else(|| MpesaError::invalid_input("phone", "not a valid Kenyan MSISDN"))?;

    let landlord_id = LandlordId(req.landlord_id);
    let tenant_id = TenantId(req.tenant_id);

    let landlord = state
        .db
        .landlord_repo()
        .require(landlord_id)
        .await
        .map_err(MpesaError::from)?;

    let tenant = state
        .db
        .tenant_repo()
        .find(tenant_id)
        .await
        .map_err(MpesaError::from)?
        .ok_or_else(|| MpesaError::NotFound(format!("tenant {tenant_id}")))?;

    let now = Utc::now();
    let landlord_key = landlord_id.to_string();
    let tenant_key = tenant_id.to_string();

    let intent = PaymentIntent {
        id: IntentId::new(),
        landlord_id,
        tenant_id,
        amount: req.amount,
        phone_number: phone,
        payment_reference: mpesa_core::payment_reference(&landlord_key, &tenant_key, now),
        account_reference: mpesa_core::account_reference_tenant(&tenant_key, now),
        transaction_desc: mpesa_core::transaction_desc_simple(now),
        business_short_code: landlord.daraja.business_short_code.clone(),
        business_type: landlord.daraja.business_type,
        bill_id: req.bill_id,
        property_id: tenant.property_id,
        status: IntentStatus::Pending,
        merchant_request_id: None,
        checkout_request_id: None,
        transaction_id: None,
        result_code: None,
        result_desc: None,
        created_at: now,
        expires_at: now + chrono::Duration::seconds(INTENT_TTL_SECS),
        callback_received: false,
        callback_data: None,
        completed_at: None,
    };

    let intent = state.intents.create(intent).await?;

    let result = state
        .stk
        .initiate(&intent, &landlord.daraja)
        .await
        .map_err(ApiError::from)?;

    state
        .intents
        .attach_checkout(
            intent.id,
            result.merchant_request_id.clone(),
            CheckoutRequestId::from(result.checkout_request_id.clone()),
        )
        .await?;

    Ok(Json(StkInitiateResponse {
        checkout_request_id: result.checkout_request_id,
        merchant_request_id: result.merchant_request_id,
    }))
}

/// `GET /api/payments/stk/:checkoutRequestID`
pub async fn get_intent(
    State(state): State<Arc<AppState>>,
    Path(checkout_request_id): Path<String>,
) -> ApiResult<Json<IntentSnapshot>> {
    let intent = state
        .intents
        .find_by_checkout(&CheckoutRequestId::from(checkout_request_id.clone()))
        .await
        .ok_or_else(|| ApiError::not_found(format!("no intent for checkout {checkout_request_id}")))?;

    Ok(Json(intent.into()))
}

/// `GET /api/payments/stk/byId/:intentId` — convenience lookup before a
/// checkout id exists (e.g. the caller only has the intent it created).
pub async fn get_intent_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<IntentSnapshot>> {
    let intent = state
        .intents
        .find_by_id(IntentId(id))
        .await
        .ok_or_else(|| ApiError::not_found(format!("intent {id}")))?;

    Ok(Json(intent.into()))
}
