//! Statement ingest coordinator (C11, §4.11)
//!
//! Orchestrates the statement text parser (C6) and the tenant match engine
//! (C7) into a persisted `Statement` plus its `TransactionMatch` rows.

mod ports;

pub use ports::{MatchRecorder, StatementStore, TenantSnapshot};

use std::sync::Arc;

use mpesa_match::match_transaction;
use mpesa_types::{LandlordId, MatchOutcome, MpesaError, Result, Statement, StatementId};

pub struct IngestCoordinator {
    statements: Arc<dyn StatementStore>,
    matches: Arc<dyn MatchRecorder>,
    tenants: Arc<dyn TenantSnapshot>,
}

impl IngestCoordinator {
    pub fn new(
        statements: Arc<dyn StatementStore>,
        matches: Arc<dyn MatchRecorder>,
        tenants: Arc<dyn TenantSnapshot>,
    ) -> Self {
        Self {
            statements,
            matches,
            tenants,
        }
    }

    /// Given raw statement text, parse it, score every transaction against
    /// the landlord's current tenant snapshot, and persist the result
    /// (§4.11 steps 1-4).
    pub async fn ingest(
        &self,
        landlord_id: LandlordId,
        file_name: String,
        raw_text: &str,
    ) -> Result<Statement> {
        let txs = mpesa_statement::parse(raw_text);

        let statement = self
            .statements
            .create(landlord_id, file_name, txs.len())
            .await?;

        if txs.is_empty() {
            tracing::info!(statement_id = %statement.id, "statement contained no Paid In records");
            return Ok(statement);
        }

        let tenants = self.tenants.list_for_landlord(landlord_id).await;
        let mut matched_count = 0usize;

        for tx in txs {
            let result = match_transaction(&tx, &tenants);
            if result.outcome != MatchOutcome::NoMatch {
                matched_count += 1;
            }
            self.matches
                .create(
                    statement.id,
                    tx,
                    result.best,
                    result.alternatives,
                    result.outcome,
                )
                .await?;
        }

        self.statements
            .set_matched_count(statement.id, matched_count)
            .await?;

        self.statements
            .find(statement.id)
            .await
            .ok_or_else(|| MpesaError::NotFound(format!("statement {}", statement.id)))
    }

    pub async fn list_for_landlord(&self, landlord_id: LandlordId) -> Result<Vec<Statement>> {
        self.statements.list_for_landlord(landlord_id).await
    }

    pub async fn get(&self, id: StatementId) -> Option<Statement> {
        self.statements.find(id).await
    }

    /// §4.11 step 5: cascades to matches; approved `PaymentHistory` rows
    /// are untouched because they key off the tenant, not the statement.
    pub async fn delete(&self, id: StatementId) -> Result<()> {
        self.statements.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mpesa_types::{
        Confidence, MatchCandidate, MatchId, MatchType, ParsedTransaction, PropertyId, Statement,
        StatementStatus, Tenant, TenantId, TransactionMatch,
    };
    use std::sync::Mutex;

    struct FakeStatements {
        inner: Mutex<Vec<Statement>>,
    }

    #[async_trait]
    impl StatementStore for FakeStatements {
        async fn create(
            &self,
            landlord_id: LandlordId,
            file_name: String,
            total_transactions: usize,
        ) -> Result<Statement> {
            let statement = Statement {
                id: mpesa_types::StatementId::new(),
                landlord_id,
                file_name,
                upload_date: chrono::Utc::now(),
                statement_period: None,
                total_transactions,
                matched_transactions: 0,
                status: StatementStatus::Uploaded,
            };
            self.inner.lock().unwrap().push(statement.clone());
            Ok(statement)
        }

        async fn find(&self, id: StatementId) -> Option<Statement> {
            self.inner.lock().unwrap().iter().find(|s| s.id == id).cloned()
        }

        async fn list_for_landlord(&self, landlord_id: LandlordId) -> Result<Vec<Statement>> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.landlord_id == landlord_id && s.status != StatementStatus::Deleted)
                .cloned()
                .collect())
        }

        async fn set_matched_count(&self, id: StatementId, matched: usize) -> Result<()> {
            let mut guard = self.inner.lock().unwrap();
            if let Some(s) = guard.iter_mut().find(|s| s.id == id) {
                s.matched_transactions = matched;
                s.status = StatementStatus::InReview;
            }
            Ok(())
        }

        async fn delete(&self, id: StatementId) -> Result<()> {
            let mut guard = self.inner.lock().unwrap();
            if let Some(s) = guard.iter_mut().find(|s| s.id == id) {
                s.status = StatementStatus::Deleted;
            }
            Ok(())
        }
    }

    struct FakeMatches {
        created: Mutex<Vec<TransactionMatch>>,
    }

    #[async_trait]
    impl MatchRecorder for FakeMatches {
        async fn create(
            &self,
            statement_id: StatementId,
            transaction: ParsedTransaction,
            matched_tenant: Option<MatchCandidate>,
            alternative_matches: Vec<MatchCandidate>,
            outcome: MatchOutcome,
        ) -> Result<TransactionMatch> {
            let m = TransactionMatch {
                id: MatchId::new(),
                statement_id,
                transaction,
                matched_tenant,
                alternative_matches,
                outcome,
                status: mpesa_types::MatchStatus::Pending,
                review_notes: None,
            };
            self.created.lock().unwrap().push(m.clone());
            Ok(m)
        }

        async fn list_for_statement(&self, statement_id: StatementId) -> Result<Vec<TransactionMatch>> {
            Ok(self
                .created
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.statement_id == statement_id)
                .cloned()
                .collect())
        }
    }

    struct FakeTenants {
        tenants: Vec<Tenant>,
    }

    #[async_trait]
    impl TenantSnapshot for FakeTenants {
        async fn list_for_landlord(&self, _landlord_id: LandlordId) -> Vec<Tenant> {
            self.tenants.clone()
        }
    }

    fn tenant(name: &str, last3: &str, rent: u64) -> Tenant {
        Tenant {
            id: TenantId::new(),
            full_name: name.to_string(),
            phone: format!("25470000{last3}"),
            rent_amount: rent,
            property_id: None::<PropertyId>,
            unit_label: None,
            email: None,
        }
    }

    fn coordinator(tenants: Vec<Tenant>) -> (IngestCoordinator, Arc<FakeStatements>, Arc<FakeMatches>) {
        let statements = Arc::new(FakeStatements {
            inner: Mutex::new(Vec::new()),
        });
        let matches = Arc::new(FakeMatches {
            created: Mutex::new(Vec::new()),
        });
        let tenants = Arc::new(FakeTenants { tenants });
        (
            IngestCoordinator::new(statements.clone(), matches.clone(), tenants),
            statements,
            matches,
        )
    }

    #[tokio::test]
    async fn empty_statement_gets_zero_totals_and_stays_uploaded() {
        let (coordinator, _statements, matches) = coordinator(Vec::new());
        let landlord_id = LandlordId::new();

        let statement = coordinator.ingest(landlord_id, "empty.txt".to_string(), "").await.unwrap();
        assert_eq!(statement.total_transactions, 0);
        assert_eq!(statement.matched_transactions, 0);
        assert_eq!(statement.status, StatementStatus::Uploaded);
        assert!(matches.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ingest_persists_a_match_per_parsed_transaction_and_counts_matched() {
        let t = tenant("John Kamau", "393", 5000);
        let (coordinator, _statements, matches) = coordinator(vec![t]);
        let landlord_id = LandlordId::new();
        let text = "\
QJI7XYZ123  2026-07-01  09:15:32  Funds received from  Completed  5,000.00  12,300.50
to - 0****393 JOHN KAMAU";

        let statement = coordinator
            .ingest(landlord_id, "july.txt".to_string(), text)
            .await
            .unwrap();

        assert_eq!(statement.total_transactions, 1);
        assert_eq!(statement.matched_transactions, 1);
        assert_eq!(statement.status, StatementStatus::InReview);
        assert_eq!(matches.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_statement_soft_deletes_it() {
        let (coordinator, _statements, _matches) = coordinator(Vec::new());
        let landlord_id = LandlordId::new();
        let statement = coordinator.ingest(landlord_id, "x.txt".to_string(), "").await.unwrap();

        coordinator.delete(statement.id).await.unwrap();
        let listed = coordinator.list_for_landlord(landlord_id).await.unwrap();
        assert!(listed.is_empty());
    }
}
