//! Statement and transaction-match aggregate (§3)

use crate::ids::{LandlordId, MatchId, StatementId, TenantId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    Uploaded,
    InReview,
    Approved,
    Deleted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub id: StatementId,
    pub landlord_id: LandlordId,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    /// Caller-supplied; the parser never derives this (§9 open question).
    pub statement_period: Option<StatementPeriod>,
    pub total_transactions: usize,
    pub matched_transactions: usize,
    pub status: StatementStatus,
}

/// A single "Paid In" line extracted from the statement text (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub receipt_no: String,
    pub completion_time: NaiveDateTime,
    pub details: String,
    /// Masked display form, e.g. `0****393`.
    pub sender_phone: String,
    /// Exactly 3 digits.
    pub sender_phone_last3: String,
    /// Title-cased.
    pub sender_name: String,
    pub amount: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    None,
    Weak,
    Partial,
    Good,
    Perfect,
}

/// A scored `(transaction, tenant)` candidate (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub phone_score: f64,
    pub name_score: f64,
    pub amount_score: f64,
    pub overall_score: f64,
    pub confidence: Confidence,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Approved,
    Rejected,
    Manual,
}

/// Outcome classification for a transaction's candidate set (§4.7 step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched,
    Ambiguous,
    NoMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionMatch {
    pub id: MatchId,
    pub statement_id: StatementId,
    pub transaction: ParsedTransaction,
    pub matched_tenant: Option<MatchCandidate>,
    pub alternative_matches: Vec<MatchCandidate>,
    pub outcome: MatchOutcome,
    pub status: MatchStatus,
    pub review_notes: Option<String>,
}
