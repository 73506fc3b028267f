//! Collaborator ports the dispatcher needs beyond the intent store.
//! Concrete (Postgres-backed) implementations live in `mpesa-db`; this
//! crate only depends on the trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mpesa_types::{LandlordId, PaymentHistory, Result, Tenant, TenantId};

#[async_trait]
pub trait CallbackLogSink: Send + Sync {
    async fn append(
        &self,
        merchant_request_id: Option<String>,
        checkout_request_id: Option<String>,
        result_code: i32,
        result_desc: String,
        raw_payload: serde_json::Value,
    ) -> Result<()>;
}

#[async_trait]
pub trait TenantLookup: Send + Sync {
    async fn find(&self, id: TenantId) -> Option<Tenant>;
}

#[async_trait]
pub trait PaymentHistoryWriter: Send + Sync {
    /// §4.9 branch: the intent settles a pre-existing bill.
    async fn settle_existing(
        &self,
        bill_id: &str,
        transaction_id: String,
        note: String,
    ) -> Result<PaymentHistory>;

    /// §4.9 branch: no bill reference, derive a fresh record from the
    /// tenant snapshot (monthly rent, no property/utility aggregate is
    /// modeled in this core — see DESIGN.md).
    async fn derive_new(
        &self,
        tenant: &Tenant,
        landlord_id: LandlordId,
        amount: u64,
        transaction_id: String,
        occurred_at: DateTime<Utc>,
    ) -> Result<PaymentHistory>;
}
