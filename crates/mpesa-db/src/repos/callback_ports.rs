//! Adapters wiring the callback dispatcher's ports (C9, §4.9) onto the
//! concrete repositories in this crate. Kept separate from the repos
//! themselves so a repo's own API stays free of port-trait concerns.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use mpesa_callback::{CallbackLogSink, PaymentHistoryWriter, TenantLookup};
use mpesa_types::{
    LandlordId, MpesaError, PaymentHistory, PaymentHistoryId, PaymentMethod, PaymentStatus,
    Result, Tenant, TenantId,
};

use super::callback_log::CallbackLogRepo;
use super::payment_history::PaymentHistoryRepo;
use super::tenant::TenantRepo;

#[async_trait]
impl CallbackLogSink for CallbackLogRepo {
    async fn append(
        &self,
        merchant_request_id: Option<String>,
        checkout_request_id: Option<String>,
        result_code: i32,
        result_desc: String,
        raw_payload: serde_json::Value,
    ) -> Result<()> {
        CallbackLogRepo::append(
            self,
            merchant_request_id,
            checkout_request_id,
            result_code,
            result_desc,
            raw_payload,
        )
        .await
        .map(|_| ())
        .map_err(MpesaError::from)
    }
}

#[async_trait]
impl TenantLookup for TenantRepo {
    async fn find(&self, id: TenantId) -> Option<Tenant> {
        TenantRepo::find(self, id).await.ok().flatten()
    }
}

#[async_trait]
impl PaymentHistoryWriter for PaymentHistoryRepo {
    /// Settles a pre-existing bill. `bill_id` is the intent's textual
    /// bill reference, which must parse into the payment history's id.
    async fn settle_existing(
        &self,
        bill_id: &str,
        transaction_id: String,
        note: String,
    ) -> Result<PaymentHistory> {
        let id: uuid::Uuid = bill_id
            .parse()
            .map_err(|_| MpesaError::invalid_input("bill_id", "not a valid id"))?;
        let id = PaymentHistoryId(id);

        let existing = PaymentHistoryRepo::require(self, id)
            .await
            .map_err(MpesaError::from)?;

        PaymentHistoryRepo::mark_settled(
            self,
            id,
            existing.amount,
            PaymentStatus::Completed,
            Some(transaction_id),
            &note,
        )
        .await
        .map_err(MpesaError::from)
    }

    async fn derive_new(
        &self,
        tenant: &Tenant,
        landlord_id: LandlordId,
        amount: u64,
        transaction_id: String,
        occurred_at: DateTime<Utc>,
    ) -> Result<PaymentHistory> {
        PaymentHistoryRepo::create(
            self,
            tenant.id,
            landlord_id,
            tenant.property_id,
            amount,
            occurred_at,
            occurred_at.month() as u8,
            occurred_at.year(),
            tenant.rent_amount,
            PaymentMethod::Mpesa,
            PaymentStatus::Completed,
            format!("M-Pesa payment: {transaction_id}"),
            Some(transaction_id),
        )
        .await
        .map_err(MpesaError::from)
    }
}
