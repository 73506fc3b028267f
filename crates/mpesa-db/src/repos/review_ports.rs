//! Adapters wiring the review workflow's ports (C10, §4.10) onto the
//! concrete repositories in this crate.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use mpesa_review::{MatchStore, PaymentHistoryRecorder, StatementLookup, TenantDirectory};
use mpesa_types::{
    LandlordId, MatchCandidate, MatchId, MatchStatus, MpesaError, PaymentHistory, PaymentMethod,
    PaymentStatus, Result, StatementId, Tenant, TenantId, TransactionMatch,
};

use super::payment_history::PaymentHistoryRepo;
use super::statement::{StatementRepo, TransactionMatchRepo};
use super::tenant::TenantRepo;

#[async_trait]
impl MatchStore for TransactionMatchRepo {
    async fn find(&self, id: MatchId) -> Option<TransactionMatch> {
        TransactionMatchRepo::find(self, id).await.ok().flatten()
    }

    async fn set_status(
        &self,
        id: MatchId,
        status: MatchStatus,
        matched_tenant: Option<MatchCandidate>,
        review_notes: Option<String>,
    ) -> Result<TransactionMatch> {
        TransactionMatchRepo::set_status(self, id, status, matched_tenant, review_notes)
            .await
            .map_err(MpesaError::from)
    }
}

#[async_trait]
impl StatementLookup for StatementRepo {
    async fn landlord_for_statement(&self, statement_id: StatementId) -> Option<LandlordId> {
        StatementRepo::find(self, statement_id)
            .await
            .ok()
            .flatten()
            .map(|s| s.landlord_id)
    }
}

#[async_trait]
impl TenantDirectory for TenantRepo {
    async fn find(&self, id: TenantId) -> Option<Tenant> {
        TenantRepo::find(self, id).await.ok().flatten()
    }

    async fn belongs_to_landlord(&self, tenant_id: TenantId, landlord_id: LandlordId) -> bool {
        TenantRepo::list_for_landlord(self, landlord_id)
            .await
            .map(|tenants| tenants.iter().any(|t| t.id == tenant_id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl PaymentHistoryRecorder for PaymentHistoryRepo {
    async fn record_approved_payment(
        &self,
        tenant: &Tenant,
        landlord_id: LandlordId,
        amount: u64,
        transaction_date: DateTime<Utc>,
        receipt_no: String,
    ) -> Result<PaymentHistory> {
        PaymentHistoryRepo::create(
            self,
            tenant.id,
            landlord_id,
            tenant.property_id,
            amount,
            transaction_date,
            transaction_date.month() as u8,
            transaction_date.year(),
            tenant.rent_amount,
            PaymentMethod::Mpesa,
            PaymentStatus::Completed,
            format!("M-Pesa receipt {receipt_no}"),
            Some(receipt_no),
        )
        .await
        .map_err(MpesaError::from)
    }
}
