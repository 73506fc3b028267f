//! AES-256-GCM credential vault
//!
//! Ciphertext on the wire/at rest is `base64(nonce || AES-GCM(plaintext))`.
//! `nonce` is 12 bytes, freshly generated per call, so `encrypt` is never
//! deterministic — two encryptions of the same plaintext differ.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{CryptoError, CryptoResult};

const NONCE_LEN: usize = 12;
/// AES-GCM appends a 16-byte authentication tag to the ciphertext.
const MIN_CIPHERTEXT_LEN: usize = NONCE_LEN + 16;

/// Fixed key used only in the development profile, with a loud warning.
/// Never used when `is_production` is true.
pub const DEV_DEFAULT_KEY: &str = "mpesa-ingest-development-only-key-do-not-use!!";

pub struct CredentialVault {
    cipher: Aes256Gcm,
}

impl CredentialVault {
    /// Build a vault from a raw 32-byte key.
    pub fn new(key_bytes: &[u8]) -> CryptoResult<Self> {
        if key_bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "expected 32-byte key, got {} bytes",
                key_bytes.len()
            )));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Load the vault key from `MPESA_ENCRYPTION_KEY` (hex or base64, 32
    /// raw bytes). Missing key is fatal outside development; in
    /// development a fixed default is used with a loud warning.
    pub fn from_env(is_production: bool) -> CryptoResult<Self> {
        match std::env::var("MPESA_ENCRYPTION_KEY") {
            Ok(raw) => Self::new(&decode_key_material(&raw)?),
            Err(_) if is_production => Err(CryptoError::MissingKeyInProduction),
            Err(_) => {
                tracing::warn!(
                    "MPESA_ENCRYPTION_KEY not set; using fixed development key. \
                     This is INSECURE and must never be used in production."
                );
                Self::new(&decode_key_material(DEV_DEFAULT_KEY)?)
            }
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    pub fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        let raw = STANDARD
            .decode(ciphertext)
            .map_err(|_| CryptoError::CredentialCorrupted)?;
        if raw.len() < MIN_CIPHERTEXT_LEN {
            return Err(CryptoError::CredentialCorrupted);
        }

        let (nonce_bytes, body) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, body)
            .map_err(|_| CryptoError::CredentialCorrupted)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::CredentialCorrupted)
    }

    /// Heuristic test for "this looks like our ciphertext" vs. legacy
    /// plaintext. Callers on read paths must tolerate both.
    pub fn is_encrypted(s: &str) -> bool {
        if s.len() < 24 {
            return false;
        }
        match STANDARD.decode(s) {
            Ok(raw) => raw.len() >= MIN_CIPHERTEXT_LEN,
            Err(_) => false,
        }
    }
}

/// Accept either hex or base64 encoding of the 32 raw key bytes.
fn decode_key_material(raw: &str) -> CryptoResult<Vec<u8>> {
    if let Ok(bytes) = hex_decode(raw) {
        if bytes.len() == 32 {
            return Ok(bytes);
        }
    }
    if let Ok(bytes) = STANDARD.decode(raw) {
        if bytes.len() == 32 {
            return Ok(bytes);
        }
    }
    Err(CryptoError::InvalidKey(
        "key material must decode to exactly 32 bytes (hex or base64)".to_string(),
    ))
}

fn hex_decode(s: &str) -> Result<Vec<u8>, ()> {
    if s.len() % 2 != 0 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ()))
        .collect()
}
