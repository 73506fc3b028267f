//! Credential Vault (C1)
//!
//! Symmetric encryption of per-landlord Daraja secrets at rest, plus the
//! heuristics the rest of the core relies on to tolerate legacy plaintext
//! rows during migration (§4.1).

mod mask;
mod vault;

pub use mask::mask;
pub use vault::{CredentialVault, DEV_DEFAULT_KEY};

use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption key missing or invalid: {0}")]
    InvalidKey(String),

    #[error("encryption failed")]
    EncryptFailed,

    /// Decrypt failed on corrupted or invalid ciphertext. Callers on the
    /// read path (C5) catch this and fall back to the raw value once, to
    /// permit migration of legacy plaintext rows.
    #[error("credential corrupted or not valid ciphertext")]
    CredentialCorrupted,

    #[error("encryption key must be configured outside development profile")]
    MissingKeyInProduction,
}
