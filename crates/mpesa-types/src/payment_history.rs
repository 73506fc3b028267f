//! Settled obligations (§3)

use crate::ids::{LandlordId, PaymentHistoryId, PropertyId, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Mpesa,
    Cash,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Completed,
    Overpaid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilityCharge {
    #[serde(rename = "type")]
    pub kind: String,
    pub units_used: f64,
    pub price_per_unit: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentHistory {
    pub id: PaymentHistoryId,
    pub tenant_id: TenantId,
    pub landlord_id: LandlordId,
    pub property_id: Option<PropertyId>,
    pub amount: u64,
    pub payment_date: DateTime<Utc>,
    pub for_month: u8,
    pub for_year: i32,
    pub monthly_rent: u64,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub notes: String,
    pub utility_charges: Vec<UtilityCharge>,
    pub total_utility_cost: f64,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The literal historical-debt marker embedded in `notes`, parsed back out
/// by receipt assembly (§4.12).
pub const HISTORICAL_DEBT_PREFIX: &str = "Includes historical debt: KSH ";

impl PaymentHistory {
    pub fn append_note(&mut self, note: &str) {
        if self.notes.is_empty() {
            self.notes = note.to_string();
        } else {
            self.notes.push_str("; ");
            self.notes.push_str(note);
        }
    }
}
