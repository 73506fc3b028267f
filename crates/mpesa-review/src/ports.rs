//! Collaborator ports the review workflow depends on (C10, §4.10). The
//! Postgres adapters live in `mpesa-db`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mpesa_types::{
    LandlordId, MatchCandidate, MatchId, MatchStatus, PaymentHistory, Result, StatementId,
    Tenant, TenantId, TransactionMatch,
};

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find(&self, id: MatchId) -> Option<TransactionMatch>;

    async fn set_status(
        &self,
        id: MatchId,
        status: MatchStatus,
        matched_tenant: Option<MatchCandidate>,
        review_notes: Option<String>,
    ) -> Result<TransactionMatch>;
}

#[async_trait]
pub trait StatementLookup: Send + Sync {
    async fn landlord_for_statement(&self, statement_id: StatementId) -> Option<LandlordId>;
}

#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find(&self, id: TenantId) -> Option<Tenant>;

    /// Used to enforce that manual re-binding only ever points at a tenant
    /// of the same landlord (§4.10).
    async fn belongs_to_landlord(&self, tenant_id: TenantId, landlord_id: LandlordId) -> bool;
}

#[async_trait]
pub trait PaymentHistoryRecorder: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn record_approved_payment(
        &self,
        tenant: &Tenant,
        landlord_id: LandlordId,
        amount: u64,
        transaction_date: DateTime<Utc>,
        receipt_no: String,
    ) -> Result<PaymentHistory>;
}
