//! Landlord Daraja provisioning DTOs (C1/C4, §4.1/§4.4)

use chrono::{DateTime, Utc};
use mpesa_types::{BusinessType, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureDarajaRequest {
    pub business_short_code: String,
    pub business_type: BusinessType,
    /// Dashboard display fields; the core persists only the Daraja-facing
    /// slice of a landlord (§1), so these are accepted but not stored.
    pub business_name: Option<String>,
    pub account_number: Option<String>,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub passkey: String,
    pub environment: Environment,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DarajaStatusResponse {
    pub is_configured: bool,
    pub is_active: bool,
    pub business_short_code: String,
    pub business_type: BusinessType,
    pub environment: Environment,
    /// Masked per §4.1; never the plaintext or the stored ciphertext.
    pub consumer_key_masked: String,
    pub passkey_masked: String,
    pub configured_at: Option<DateTime<Utc>>,
    pub last_tested_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultResponse {
    pub success: bool,
    pub message: String,
    pub tested_at: DateTime<Utc>,
}
