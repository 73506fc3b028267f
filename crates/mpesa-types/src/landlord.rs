//! Landlord Daraja configuration
//!
//! The core only owns the Daraja-facing slice of a Landlord; everything
//! else (profile, settings, properties) belongs to the collaborator
//! dashboard and is out of scope (§1).

use crate::ids::LandlordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which Daraja environment a landlord's credentials target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox.safaricom.co.ke",
            Environment::Production => "https://api.safaricom.co.ke",
        }
    }
}

/// M-Pesa merchant account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Paybill,
    Till,
}

impl BusinessType {
    /// Daraja's `TransactionType` field for the STK push request.
    pub fn transaction_type(self) -> &'static str {
        match self {
            BusinessType::Paybill => "CustomerPayBillOnline",
            BusinessType::Till => "CustomerBuyGoodsOnline",
        }
    }
}

/// A landlord's Daraja (M-Pesa) credentials and gateway configuration.
///
/// Secrets (`consumer_key`, `consumer_secret`, `passkey`) are stored as
/// ciphertext at rest; plaintext exists only transiently during a single
/// STK call (see `mpesa-crypto::vault`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DarajaConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub passkey: String,
    pub environment: Environment,
    pub business_short_code: String,
    pub business_type: BusinessType,
    pub is_configured: bool,
    pub is_active: bool,
    pub configured_at: Option<DateTime<Utc>>,
    pub last_tested_at: Option<DateTime<Utc>>,
}

impl DarajaConfig {
    /// §3 invariant: if configured, every credential field is non-empty.
    pub fn invariant_holds(&self) -> bool {
        if !self.is_configured {
            return true;
        }
        !self.consumer_key.is_empty()
            && !self.consumer_secret.is_empty()
            && !self.passkey.is_empty()
            && !self.business_short_code.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.is_configured && self.is_active
    }
}

/// Landlord identity as the core needs it: just enough to drive Daraja.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landlord {
    pub id: LandlordId,
    pub daraja: DarajaConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_landlord_passes_invariant_regardless_of_empty_fields() {
        let cfg = DarajaConfig {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            passkey: String::new(),
            environment: Environment::Sandbox,
            business_short_code: String::new(),
            business_type: BusinessType::Paybill,
            is_configured: false,
            is_active: false,
            configured_at: None,
            last_tested_at: None,
        };
        assert!(cfg.invariant_holds());
    }

    #[test]
    fn configured_landlord_with_empty_secret_violates_invariant() {
        let cfg = DarajaConfig {
            consumer_key: "key".into(),
            consumer_secret: String::new(),
            passkey: "pass".into(),
            environment: Environment::Sandbox,
            business_short_code: "123456".into(),
            business_type: BusinessType::Paybill,
            is_configured: true,
            is_active: true,
            configured_at: None,
            last_tested_at: None,
        };
        assert!(!cfg.invariant_holds());
    }
}
