//! Transaction match review workflow (C10, §4.10)
//!
//! A `TransactionMatch` moves through `pending`/`manual` -> `approved`/
//! `rejected`. Approval derives a `PaymentHistory` record from the bound
//! candidate; the other transitions are bookkeeping only. Terminal states
//! (`approved`, `rejected`) are idempotent: any further action is a no-op.

mod ports;

pub use ports::{MatchStore, PaymentHistoryRecorder, StatementLookup, TenantDirectory};

use std::sync::Arc;

use chrono::Utc;
use mpesa_types::{MatchId, MatchStatus, MpesaError, Result, TenantId, TransactionMatch};

pub struct ReviewService {
    matches: Arc<dyn MatchStore>,
    statements: Arc<dyn StatementLookup>,
    tenants: Arc<dyn TenantDirectory>,
    history: Arc<dyn PaymentHistoryRecorder>,
}

impl ReviewService {
    pub fn new(
        matches: Arc<dyn MatchStore>,
        statements: Arc<dyn StatementLookup>,
        tenants: Arc<dyn TenantDirectory>,
        history: Arc<dyn PaymentHistoryRecorder>,
    ) -> Self {
        Self {
            matches,
            statements,
            tenants,
            history,
        }
    }

    /// `pending`/`manual` -> `approved`. Rejects with `UnmatchedApprove`
    /// when there is no bound candidate. A second approve on an already
    /// terminal match is a silent no-op.
    pub async fn approve(&self, id: MatchId, notes: Option<String>) -> Result<TransactionMatch> {
        let current = self.require(id).await?;
        if is_terminal(current.status) {
            return Ok(current);
        }

        let candidate = current
            .matched_tenant
            .clone()
            .ok_or(MpesaError::UnmatchedApprove)?;

        let landlord_id = self
            .statements
            .landlord_for_statement(current.statement_id)
            .await
            .ok_or_else(|| MpesaError::NotFound(format!("statement {}", current.statement_id)))?;

        let tenant = self
            .tenants
            .find(candidate.tenant_id)
            .await
            .ok_or_else(|| MpesaError::NotFound(format!("tenant {}", candidate.tenant_id)))?;

        let transaction_date = current.transaction.completion_time.and_utc();
        let amount = current.transaction.amount.round() as u64;
        let receipt_no = current.transaction.receipt_no.clone();

        let history = self
            .history
            .record_approved_payment(&tenant, landlord_id, amount, transaction_date, receipt_no.clone())
            .await?;

        let review_notes = notes.unwrap_or_else(|| format!("M-Pesa receipt {receipt_no}"));
        tracing::info!(match_id = %id, payment_history_id = %history.id, "transaction match approved");

        self.matches
            .set_status(id, MatchStatus::Approved, Some(candidate), Some(review_notes))
            .await
    }

    /// `pending`/`manual` -> `rejected`. No side effect beyond marking;
    /// idempotent once already terminal.
    pub async fn reject(&self, id: MatchId, notes: Option<String>) -> Result<TransactionMatch> {
        let current = self.require(id).await?;
        if is_terminal(current.status) {
            return Ok(current);
        }

        self.matches
            .set_status(id, MatchStatus::Rejected, current.matched_tenant.clone(), notes)
            .await
    }

    /// `pending` -> `manual`: replaces `matchedTenant` with an explicitly
    /// chosen tenant. Only `pending` is eligible per §4.10's table; a match
    /// already `manual`, `approved`, or `rejected` is left untouched.
    pub async fn manual_match(&self, id: MatchId, tenant_id: TenantId) -> Result<TransactionMatch> {
        let current = self.require(id).await?;
        if current.status != MatchStatus::Pending {
            return Ok(current);
        }

        let landlord_id = self
            .statements
            .landlord_for_statement(current.statement_id)
            .await
            .ok_or_else(|| MpesaError::NotFound(format!("statement {}", current.statement_id)))?;

        if !self.tenants.belongs_to_landlord(tenant_id, landlord_id).await {
            return Err(MpesaError::invalid_input(
                "tenantId",
                "tenant does not belong to this statement's landlord",
            ));
        }

        let tenant = self
            .tenants
            .find(tenant_id)
            .await
            .ok_or_else(|| MpesaError::NotFound(format!("tenant {tenant_id}")))?;

        let candidate = mpesa_types::MatchCandidate {
            tenant_id: tenant.id,
            tenant_name: tenant.full_name.clone(),
            phone_score: 0.0,
            name_score: 0.0,
            amount_score: 0.0,
            overall_score: 0.0,
            confidence: mpesa_types::Confidence::None,
            match_type: mpesa_types::MatchType::None,
        };

        self.matches
            .set_status(id, MatchStatus::Manual, Some(candidate), current.review_notes.clone())
            .await
    }

    async fn require(&self, id: MatchId) -> Result<TransactionMatch> {
        self.matches
            .find(id)
            .await
            .ok_or_else(|| MpesaError::NotFound(format!("transaction match {id}")))
    }
}

fn is_terminal(status: MatchStatus) -> bool {
    matches!(status, MatchStatus::Approved | MatchStatus::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use mpesa_types::{
        Confidence, LandlordId, MatchCandidate, MatchOutcome, MatchType, ParsedTransaction,
        PaymentHistory, PaymentHistoryId, PaymentMethod, PaymentStatus, StatementId, Tenant,
    };
    use std::sync::Mutex;

    struct FakeMatches {
        inner: Mutex<TransactionMatch>,
    }

    #[async_trait]
    impl MatchStore for FakeMatches {
        async fn find(&self, _id: MatchId) -> Option<TransactionMatch> {
            Some(self.inner.lock().unwrap().clone())
        }

        async fn set_status(
            &self,
            _id: MatchId,
            status: MatchStatus,
            matched_tenant: Option<MatchCandidate>,
            review_notes: Option<String>,
        ) -> Result<TransactionMatch> {
            let mut guard = self.inner.lock().unwrap();
            guard.status = status;
            guard.matched_tenant = matched_tenant;
            guard.review_notes = review_notes;
            Ok(guard.clone())
        }
    }

    struct FakeStatements {
        landlord_id: LandlordId,
    }

    #[async_trait]
    impl StatementLookup for FakeStatements {
        async fn landlord_for_statement(&self, _statement_id: StatementId) -> Option<LandlordId> {
            Some(self.landlord_id)
        }
    }

    struct FakeTenants {
        tenants: Vec<Tenant>,
        landlord_id: LandlordId,
    }

    #[async_trait]
    impl TenantDirectory for FakeTenants {
        async fn find(&self, id: TenantId) -> Option<Tenant> {
            self.tenants.iter().find(|t| t.id == id).cloned()
        }

        async fn belongs_to_landlord(&self, tenant_id: TenantId, landlord_id: LandlordId) -> bool {
            landlord_id == self.landlord_id && self.tenants.iter().any(|t| t.id == tenant_id)
        }
    }

    struct FakeHistory {
        created: Mutex<Vec<PaymentHistory>>,
    }

    #[async_trait]
    impl PaymentHistoryRecorder for FakeHistory {
        async fn record_approved_payment(
            &self,
            tenant: &Tenant,
            landlord_id: LandlordId,
            amount: u64,
            transaction_date: chrono::DateTime<Utc>,
            receipt_no: String,
        ) -> Result<PaymentHistory> {
            let history = PaymentHistory {
                id: PaymentHistoryId::new(),
                tenant_id: tenant.id,
                landlord_id,
                property_id: None,
                amount,
                payment_date: transaction_date,
                for_month: 7,
                for_year: 2026,
                monthly_rent: tenant.rent_amount,
                payment_method: PaymentMethod::Mpesa,
                status: PaymentStatus::Completed,
                notes: format!("M-Pesa receipt {receipt_no}"),
                utility_charges: Vec::new(),
                total_utility_cost: 0.0,
                transaction_id: Some(receipt_no),
                created_at: Utc::now(),
            };
            self.created.lock().unwrap().push(history.clone());
            Ok(history)
        }
    }

    fn tenant(name: &str) -> Tenant {
        Tenant {
            id: TenantId::new(),
            full_name: name.to_string(),
            phone: "254712345678".to_string(),
            rent_amount: 5000,
            property_id: None,
            unit_label: None,
            email: None,
        }
    }

    fn sample_match(status: MatchStatus, matched_tenant: Option<MatchCandidate>) -> TransactionMatch {
        TransactionMatch {
            id: MatchId::new(),
            statement_id: StatementId::new(),
            transaction: ParsedTransaction {
                receipt_no: "QJI1ABCD23".to_string(),
                completion_time: chrono::NaiveDate::from_ymd_opt(2026, 7, 15)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
                details: "Funds received from JOHN KAMAU".to_string(),
                sender_phone: "0****393".to_string(),
                sender_phone_last3: "393".to_string(),
                sender_name: "John Kamau".to_string(),
                amount: 5000.0,
                balance: 100000.0,
            },
            matched_tenant,
            alternative_matches: Vec::new(),
            outcome: MatchOutcome::Matched,
            status,
            review_notes: None,
        }
    }

    fn candidate(tenant: &Tenant) -> MatchCandidate {
        MatchCandidate {
            tenant_id: tenant.id,
            tenant_name: tenant.full_name.clone(),
            phone_score: 100.0,
            name_score: 100.0,
            amount_score: 100.0,
            overall_score: 100.0,
            confidence: Confidence::High,
            match_type: MatchType::Perfect,
        }
    }

    fn service(matched: TransactionMatch, tenants: Vec<Tenant>, landlord_id: LandlordId) -> (ReviewService, Arc<FakeHistory>) {
        let matches = Arc::new(FakeMatches {
            inner: Mutex::new(matched),
        });
        let statements = Arc::new(FakeStatements { landlord_id });
        let tenants = Arc::new(FakeTenants { tenants, landlord_id });
        let history = Arc::new(FakeHistory {
            created: Mutex::new(Vec::new()),
        });
        (
            ReviewService::new(matches, statements, tenants, history.clone()),
            history,
        )
    }

    #[tokio::test]
    async fn approving_a_matched_transaction_creates_payment_history() {
        let t = tenant("John Kamau");
        let landlord_id = LandlordId::new();
        let m = sample_match(MatchStatus::Pending, Some(candidate(&t)));
        let id = m.id;
        let (svc, history) = service(m, vec![t], landlord_id);

        let result = svc.approve(id, None).await.unwrap();
        assert_eq!(result.status, MatchStatus::Approved);
        assert_eq!(history.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approving_an_unmatched_transaction_is_rejected() {
        let landlord_id = LandlordId::new();
        let m = sample_match(MatchStatus::Pending, None);
        let id = m.id;
        let (svc, history) = service(m, Vec::new(), landlord_id);

        let err = svc.approve(id, None).await.unwrap_err();
        assert!(matches!(err, MpesaError::UnmatchedApprove));
        assert!(history.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn approving_an_already_approved_match_is_a_no_op() {
        let t = tenant("John Kamau");
        let landlord_id = LandlordId::new();
        let m = sample_match(MatchStatus::Approved, Some(candidate(&t)));
        let id = m.id;
        let (svc, history) = service(m, vec![t], landlord_id);

        svc.approve(id, None).await.unwrap();
        assert!(history.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn manual_match_rejects_a_tenant_from_another_landlord() {
        let stranger = tenant("Stranger");
        let landlord_id = LandlordId::new();
        let m = sample_match(MatchStatus::Pending, None);
        let id = m.id;
        let (svc, _history) = service(m, Vec::new(), landlord_id);

        let err = svc.manual_match(id, stranger.id).await.unwrap_err();
        assert!(matches!(err, MpesaError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn manual_match_binds_the_chosen_tenant_and_becomes_approvable() {
        let t = tenant("Jane Wanjiru");
        let landlord_id = LandlordId::new();
        let m = sample_match(MatchStatus::Pending, None);
        let id = m.id;
        let (svc, history) = service(m, vec![t.clone()], landlord_id);

        let bound = svc.manual_match(id, t.id).await.unwrap();
        assert_eq!(bound.status, MatchStatus::Manual);
        assert_eq!(bound.matched_tenant.unwrap().tenant_id, t.id);

        let approved = svc.approve(id, None).await.unwrap();
        assert_eq!(approved.status, MatchStatus::Approved);
        assert_eq!(history.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejecting_a_pending_match_requires_no_candidate() {
        let landlord_id = LandlordId::new();
        let m = sample_match(MatchStatus::Pending, None);
        let id = m.id;
        let (svc, _history) = service(m, Vec::new(), landlord_id);

        let result = svc.reject(id, Some("not a tenant".to_string())).await.unwrap();
        assert_eq!(result.status, MatchStatus::Rejected);
    }
}
