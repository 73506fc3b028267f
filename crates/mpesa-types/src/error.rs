//! Shared error taxonomy
//!
//! Each crate that needs a richer, domain-specific error defines its own
//! `thiserror` enum; this one covers the handful of failure kinds that cut
//! across component boundaries (§7 of the specification).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MpesaError>;

#[derive(Debug, Clone, Error)]
pub enum MpesaError {
    #[error("invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("gateway not configured for landlord {landlord_id}")]
    GatewayNotConfigured { landlord_id: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// §4.10: approve was called on a `TransactionMatch` with no
    /// `matchedTenant`.
    #[error("cannot approve an unmatched transaction")]
    UnmatchedApprove,

    #[error("internal error: {0}")]
    Internal(String),
}

impl MpesaError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code for API responses, mirroring the teacher's
    /// `OpeniBankError::error_code`.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::GatewayNotConfigured { .. } => "GATEWAY_NOT_CONFIGURED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UnmatchedApprove => "UNMATCHED_APPROVE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
