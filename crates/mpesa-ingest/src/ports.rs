//! Collaborator ports the ingest coordinator depends on (C11, §4.11). The
//! Postgres adapters live in `mpesa-db`.

use async_trait::async_trait;
use mpesa_types::{
    LandlordId, MatchCandidate, MatchOutcome, ParsedTransaction, Result, Statement, StatementId,
    Tenant, TransactionMatch,
};

#[async_trait]
pub trait TenantSnapshot: Send + Sync {
    async fn list_for_landlord(&self, landlord_id: LandlordId) -> Vec<Tenant>;
}

#[async_trait]
pub trait StatementStore: Send + Sync {
    async fn create(
        &self,
        landlord_id: LandlordId,
        file_name: String,
        total_transactions: usize,
    ) -> Result<Statement>;

    async fn find(&self, id: StatementId) -> Option<Statement>;

    async fn list_for_landlord(&self, landlord_id: LandlordId) -> Result<Vec<Statement>>;

    async fn set_matched_count(&self, id: StatementId, matched: usize) -> Result<()>;

    /// Soft-deletes the statement; cascades to its matches (§4.11 step 5).
    async fn delete(&self, id: StatementId) -> Result<()>;
}

#[async_trait]
pub trait MatchRecorder: Send + Sync {
    async fn create(
        &self,
        statement_id: StatementId,
        transaction: ParsedTransaction,
        matched_tenant: Option<MatchCandidate>,
        alternative_matches: Vec<MatchCandidate>,
        outcome: MatchOutcome,
    ) -> Result<TransactionMatch>;

    async fn list_for_statement(&self, statement_id: StatementId) -> Result<Vec<TransactionMatch>>;
}
