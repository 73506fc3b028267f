//! Adapters wiring the statement ingest coordinator's ports (C11, §4.11)
//! onto the concrete repositories in this crate.

use async_trait::async_trait;
use mpesa_ingest::{MatchRecorder, StatementStore, TenantSnapshot};
use mpesa_types::{
    LandlordId, MatchCandidate, MatchOutcome, MpesaError, ParsedTransaction, Result, Statement,
    StatementId, Tenant, TransactionMatch,
};

use super::statement::{StatementRepo, TransactionMatchRepo};
use super::tenant::TenantRepo;

#[async_trait]
impl StatementStore for StatementRepo {
    async fn create(
        &self,
        landlord_id: LandlordId,
        file_name: String,
        total_transactions: usize,
    ) -> Result<Statement> {
        StatementRepo::create(self, landlord_id, file_name, None, total_transactions)
            .await
            .map_err(MpesaError::from)
    }

    async fn find(&self, id: StatementId) -> Option<Statement> {
        StatementRepo::find(self, id).await.ok().flatten()
    }

    async fn list_for_landlord(&self, landlord_id: LandlordId) -> Result<Vec<Statement>> {
        StatementRepo::list_for_landlord(self, landlord_id)
            .await
            .map_err(MpesaError::from)
    }

    async fn set_matched_count(&self, id: StatementId, matched: usize) -> Result<()> {
        StatementRepo::set_matched_count(self, id, matched)
            .await
            .map_err(MpesaError::from)
    }

    async fn delete(&self, id: StatementId) -> Result<()> {
        StatementRepo::soft_delete(self, id).await.map_err(MpesaError::from)
    }
}

#[async_trait]
impl MatchRecorder for TransactionMatchRepo {
    async fn create(
        &self,
        statement_id: StatementId,
        transaction: ParsedTransaction,
        matched_tenant: Option<MatchCandidate>,
        alternative_matches: Vec<MatchCandidate>,
        outcome: MatchOutcome,
    ) -> Result<TransactionMatch> {
        TransactionMatchRepo::create(
            self,
            statement_id,
            transaction,
            matched_tenant,
            alternative_matches,
            outcome,
        )
        .await
        .map_err(MpesaError::from)
    }

    async fn list_for_statement(&self, statement_id: StatementId) -> Result<Vec<TransactionMatch>> {
        TransactionMatchRepo::list_for_statement(self, statement_id)
            .await
            .map_err(MpesaError::from)
    }
}

#[async_trait]
impl TenantSnapshot for TenantRepo {
    async fn list_for_landlord(&self, landlord_id: LandlordId) -> Vec<Tenant> {
        TenantRepo::list_for_landlord(self, landlord_id)
            .await
            .unwrap_or_default()
    }
}
