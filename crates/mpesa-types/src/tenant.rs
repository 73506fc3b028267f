//! Tenant snapshot types
//!
//! The core treats the tenant set as an immutable snapshot during a
//! statement review (§3); tenant CRUD itself is out of scope (§1).

use crate::ids::{PropertyId, TenantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub full_name: String,
    /// Already normalized to `254XXXXXXXXX` form.
    pub phone: String,
    pub rent_amount: u64,
    pub property_id: Option<PropertyId>,
    pub unit_label: Option<String>,
    /// Contact email for payment notifications (§4.9); absent means the
    /// callback dispatcher skips the email-sink step for this tenant.
    pub email: Option<String>,
}

impl Tenant {
    pub fn phone_last3(&self) -> Option<&str> {
        if self.phone.len() >= 3 {
            Some(&self.phone[self.phone.len() - 3..])
        } else {
            None
        }
    }
}
