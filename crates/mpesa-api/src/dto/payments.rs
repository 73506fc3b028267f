//! STK Push DTOs (C5/C8, §4.5/§4.8)

use chrono::{DateTime, Utc};
use mpesa_types::{IntentStatus, PaymentIntent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StkInitiateRequest {
    pub landlord_id: Uuid,
    pub tenant_id: Uuid,
    pub phone: String,
    pub amount: u64,
    /// If set, the callback settles this pre-existing `PaymentHistory`
    /// record instead of deriving a new one (§4.9 C9 branch).
    pub bill_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StkInitiateResponse {
    pub checkout_request_id: String,
    pub merchant_request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentSnapshot {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub tenant_id: Uuid,
    pub status: IntentStatus,
    pub amount: u64,
    pub phone_number: String,
    pub payment_reference: String,
    pub account_reference: String,
    pub checkout_request_id: Option<String>,
    pub transaction_id: Option<String>,
    pub result_code: Option<i32>,
    pub result_desc: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<PaymentIntent> for IntentSnapshot {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            id: intent.id.0,
            landlord_id: intent.landlord_id.0,
            tenant_id: intent.tenant_id.0,
            status: intent.status,
            amount: intent.amount,
            phone_number: intent.phone_number,
            payment_reference: intent.payment_reference,
            account_reference: intent.account_reference,
            checkout_request_id: intent.checkout_request_id.map(|c| c.0),
            transaction_id: intent.transaction_id,
            result_code: intent.result_code,
            result_desc: intent.result_desc,
            created_at: intent.created_at,
            expires_at: intent.expires_at,
            completed_at: intent.completed_at,
        }
    }
}
