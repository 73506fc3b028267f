//! Daraja client errors (§7)

use thiserror::Error;

pub type DarajaResult<T> = Result<T, DarajaError>;

#[derive(Debug, Error)]
pub enum DarajaError {
    #[error("Daraja gateway not configured or inactive for this landlord")]
    GatewayNotConfigured,

    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Daraja OAuth failed: {0}")]
    AuthFailed(String),

    #[error("Daraja rejected the STK request: {0}")]
    StkRejected(String),

    #[error("Daraja request timed out (retryable={retryable})")]
    Timeout { retryable: bool },

    #[error("Daraja transport error: {0}")]
    Transport(String),
}
