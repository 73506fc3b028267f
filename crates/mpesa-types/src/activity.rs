//! Activity, email, and receipt events emitted alongside callback/review
//! processing (§4.9, §4.12). These are data carried to out-of-scope
//! collaborator systems (dashboards, SMTP, PDF rendering) — the core only
//! shapes the payload (§1 Non-goals).

use crate::ids::{LandlordId, PaymentHistoryId, PropertyId, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who an activity-log entry is attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "actor_type", rename_all = "snake_case")]
pub enum ActivityActor {
    Landlord(LandlordId),
    Tenant(TenantId),
}

/// Activity kinds the core emits (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PaymentReceived,
    PaymentProcessed,
    PaymentFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub actor: ActivityActor,
    pub kind: ActivityKind,
    pub metadata: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

/// Notification sent to a tenant on successful payment (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceivedEmail {
    pub tenant_name: String,
    pub tenant_email: String,
    pub amount: u64,
    pub payment_date: DateTime<Utc>,
    pub receipt_number: String,
    pub property_name: Option<String>,
    pub unit_number: Option<String>,
    pub for_period: String,
}

/// The assembled receipt handed to the external PDF sink (§4.12).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub payment_history_id: PaymentHistoryId,
    pub tenant_id: TenantId,
    pub landlord_id: LandlordId,
    pub property_id: Option<PropertyId>,
    pub receipt_number: String,
    pub payment_period: String,
    pub amount: u64,
    pub utility_charges: Vec<crate::payment_history::UtilityCharge>,
    pub total_utility_cost: f64,
    pub historical_debt: f64,
    pub historical_debt_details: Option<String>,
    pub current_month_rent: f64,
    pub generated_at: DateTime<Utc>,
}
