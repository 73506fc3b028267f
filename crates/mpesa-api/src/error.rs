//! API error handling (§7)
//!
//! Maps the two error taxonomies handlers see — `mpesa_types::MpesaError`
//! for the domain core and `mpesa_daraja::DarajaError` for the gateway
//! client — onto the HTTP status codes the error-handling table specifies.
//! Handlers never match on either error enum themselves; `?` plus `From`
//! does the translation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl From<mpesa_types::MpesaError> for ApiError {
    fn from(err: mpesa_types::MpesaError) -> Self {
        use mpesa_types::MpesaError::*;
        let status = match &err {
            InvalidInput { .. } => StatusCode::BAD_REQUEST,
            GatewayNotConfigured { .. } => StatusCode::CONFLICT,
            NotFound(_) => StatusCode::NOT_FOUND,
            UnmatchedApprove => StatusCode::UNPROCESSABLE_ENTITY,
            Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.error_code(), err.to_string())
    }
}

impl From<mpesa_daraja::DarajaError> for ApiError {
    fn from(err: mpesa_daraja::DarajaError) -> Self {
        use mpesa_daraja::DarajaError::*;
        let (status, code) = match &err {
            GatewayNotConfigured => (StatusCode::CONFLICT, "GATEWAY_NOT_CONFIGURED"),
            InvalidPhone(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AuthFailed(_) => (StatusCode::BAD_GATEWAY, "DARAJA_AUTH_FAILED"),
            StkRejected(_) => (StatusCode::BAD_GATEWAY, "STK_REJECTED"),
            Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "DARAJA_TIMEOUT"),
            Transport(_) => (StatusCode::BAD_GATEWAY, "DARAJA_TRANSPORT"),
        };
        Self::new(status, code, err.to_string())
    }
}
