//! Landlord Daraja provisioning (C1/C4, §4.1/§4.4)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use mpesa_crypto::CredentialVault;
use mpesa_types::{DarajaConfig, LandlordId, MpesaError};
use uuid::Uuid;

use crate::dto::{ConfigureDarajaRequest, DarajaStatusResponse, SuccessResponse, TestResultResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `POST /api/landlords/:id/daraja/configure`
pub async fn configure(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfigureDarajaRequest>,
) -> ApiResult<Json<DarajaStatusResponse>> {
    let encrypt = |plain: &str| -> ApiResult<String> {
        state
            .vault
            .encrypt(plain)
            .map_err(|e| MpesaError::Internal(e.to_string()).into())
    };

    let daraja = DarajaConfig {
        consumer_key: encrypt(&req.consumer_key)?,
        consumer_secret: encrypt(&req.consumer_secret)?,
        passkey: encrypt(&req.passkey)?,
        environment: req.environment,
        business_short_code: req.business_short_code,
        business_type: req.business_type,
        is_configured: true,
        is_active: true,
        configured_at: None,
        last_tested_at: None,
    };

    if !daraja.invariant_holds() {
        return Err(MpesaError::invalid_input(
            "daraja",
            "business short code and credentials must be non-empty",
        )
        .into());
    }

    let landlord_id = LandlordId(id);
    let landlord = state
        .db
        .landlord_repo()
        .configure(landlord_id, &daraja)
        .await
        .map_err(MpesaError::from)?;

    Ok(Json(to_status_response(&state.vault, &landlord.daraja)))
}

/// `GET /api/landlords/:id/daraja/status`
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DarajaStatusResponse>> {
    let landlord = state
        .db
        .landlord_repo()
        .require(LandlordId(id))
        .await
        .map_err(MpesaError::from)?;

    Ok(Json(to_status_response(&state.vault, &landlord.daraja)))
}

/// `POST /api/landlords/:id/daraja/test`
pub async fn test(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TestResultResponse>> {
    let landlord_id = LandlordId(id);
    let landlord = state
        .db
        .landlord_repo()
        .require(landlord_id)
        .await
        .map_err(MpesaError::from)?;

    match state.stk.test_auth(&landlord.daraja).await {
        Ok(()) => {
            state
                .db
                .landlord_repo()
                .mark_tested(landlord_id)
                .await
                .map_err(MpesaError::from)?;
            Ok(Json(TestResultResponse {
                success: true,
                message: "Daraja credentials are valid".to_string(),
                tested_at: Utc::now(),
            }))
        }
        Err(e) => Ok(Json(TestResultResponse {
            success: false,
            message: e.to_string(),
            tested_at: Utc::now(),
        })),
    }
}

/// `DELETE /api/landlords/:id/daraja/configure`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .db
        .landlord_repo()
        .deactivate(LandlordId(id))
        .await
        .map_err(MpesaError::from)?;

    Ok(Json(SuccessResponse::ok()))
}

fn to_status_response(vault: &CredentialVault, daraja: &DarajaConfig) -> DarajaStatusResponse {
    DarajaStatusResponse {
        is_configured: daraja.is_configured,
        is_active: daraja.is_active,
        business_short_code: daraja.business_short_code.clone(),
        business_type: daraja.business_type,
        environment: daraja.environment,
        consumer_key_masked: mask_stored_secret(vault, &daraja.consumer_key),
        passkey_masked: mask_stored_secret(vault, &daraja.passkey),
        configured_at: daraja.configured_at,
        last_tested_at: daraja.last_tested_at,
    }
}

/// Tolerates legacy plaintext the same way the STK client's read path does
/// (§4.1), so a status response never fails just because a row predates
/// encryption.
fn mask_stored_secret(vault: &CredentialVault, stored: &str) -> String {
    if !CredentialVault::is_encrypted(stored) {
        return mpesa_crypto::mask(stored, 4);
    }
    match vault.decrypt(stored) {
        Ok(plain) => mpesa_crypto::mask(&plain, 4),
        Err(_) => mpesa_crypto::mask(stored, 4),
    }
}
