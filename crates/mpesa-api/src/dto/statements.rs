//! Statement upload/review DTOs (C6/C7/C11, §4.6/§4.7/§4.11)

use chrono::{DateTime, Utc};
use mpesa_types::{
    Confidence, MatchOutcome, MatchStatus, MatchType, ParsedTransaction, Statement,
    StatementStatus, TransactionMatch,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatementRequest {
    pub landlord_id: Uuid,
    pub file_name: String,
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementSummaryResponse {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub total_transactions: usize,
    pub matched_transactions: usize,
    pub status: StatementStatus,
}

impl From<Statement> for StatementSummaryResponse {
    fn from(s: Statement) -> Self {
        Self {
            id: s.id.0,
            landlord_id: s.landlord_id.0,
            file_name: s.file_name,
            upload_date: s.upload_date,
            total_transactions: s.total_transactions,
            matched_transactions: s.matched_transactions,
            status: s.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementListResponse {
    pub statements: Vec<StatementSummaryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidateResponse {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub phone_score: f64,
    pub name_score: f64,
    pub amount_score: f64,
    pub overall_score: f64,
    pub confidence: Confidence,
    pub match_type: MatchType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMatchResponse {
    pub id: Uuid,
    pub statement_id: Uuid,
    pub transaction: ParsedTransaction,
    pub matched_tenant: Option<MatchCandidateResponse>,
    pub alternative_matches: Vec<MatchCandidateResponse>,
    pub outcome: MatchOutcome,
    pub status: MatchStatus,
    pub review_notes: Option<String>,
}

impl From<TransactionMatch> for TransactionMatchResponse {
    fn from(m: TransactionMatch) -> Self {
        Self {
            id: m.id.0,
            statement_id: m.statement_id.0,
            transaction: m.transaction,
            matched_tenant: m.matched_tenant.map(Into::into),
            alternative_matches: m.alternative_matches.into_iter().map(Into::into).collect(),
            outcome: m.outcome,
            status: m.status,
            review_notes: m.review_notes,
        }
    }
}

impl From<mpesa_types::MatchCandidate> for MatchCandidateResponse {
    fn from(c: mpesa_types::MatchCandidate) -> Self {
        Self {
            tenant_id: c.tenant_id.0,
            tenant_name: c.tenant_name,
            phone_score: c.phone_score,
            name_score: c.name_score,
            amount_score: c.amount_score,
            overall_score: c.overall_score,
            confidence: c.confidence,
            match_type: c.match_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementDetailResponse {
    pub statement: StatementSummaryResponse,
    pub matches: Vec<TransactionMatchResponse>,
}
