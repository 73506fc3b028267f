//! Payment intent — the STK Push lifecycle aggregate (§3, §4.8)

use crate::ids::{CheckoutRequestId, IntentId, LandlordId, PropertyId, TenantId};
use crate::landlord::BusinessType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Pending,
    Success,
    Failed,
    Timeout,
    Cancelled,
}

impl IntentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, IntentStatus::Pending)
    }
}

/// Number of seconds after creation an intent is eligible for passive
/// reclamation as a timeout (§3: `expiresAt = createdAt + 2min`).
pub const INTENT_TTL_SECS: i64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: IntentId,
    pub landlord_id: LandlordId,
    pub tenant_id: TenantId,
    /// KES, rounded to an integer for Daraja.
    pub amount: u64,
    /// Normalized `254XXXXXXXXX` phone.
    pub phone_number: String,
    pub payment_reference: String,
    pub account_reference: String,
    pub transaction_desc: String,
    pub business_short_code: String,
    pub business_type: BusinessType,
    /// If this payment is settling a pre-existing bill record, rather than
    /// creating a new `PaymentHistory` row from scratch (§4.9 C9 branch).
    pub bill_id: Option<String>,
    /// Optional property/unit context carried through to receipt assembly.
    pub property_id: Option<PropertyId>,

    pub status: IntentStatus,
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<CheckoutRequestId>,
    pub transaction_id: Option<String>,
    pub result_code: Option<i32>,
    pub result_desc: Option<String>,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub callback_received: bool,
    pub callback_data: Option<serde_json::Value>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PaymentIntent {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == IntentStatus::Pending && now > self.expires_at
    }
}
