//! Row types as stored in Postgres, and their conversions to/from the
//! domain types in `mpesa-types`. Kept separate from the domain types so a
//! schema column rename doesn't ripple into business logic.

use chrono::{DateTime, Utc};
use mpesa_types::landlord::{BusinessType, Environment};
use mpesa_types::statement::{
    MatchCandidate, MatchOutcome, MatchStatus, ParsedTransaction, Statement, StatementStatus,
    TransactionMatch,
};
use mpesa_types::{
    CallbackLog, DarajaConfig, IntentStatus, Landlord, LandlordId, PaymentHistory, PaymentIntent,
    PaymentMethod, PaymentStatus, PropertyId, Tenant, UtilityCharge,
};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, FromRow)]
pub struct DbLandlord {
    pub id: Uuid,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub passkey: String,
    pub environment: String,
    pub business_short_code: String,
    pub business_type: String,
    pub is_configured: bool,
    pub is_active: bool,
    pub configured_at: Option<DateTime<Utc>>,
    pub last_tested_at: Option<DateTime<Utc>>,
}

impl DbLandlord {
    pub fn into_domain(self) -> DbResult<Landlord> {
        Ok(Landlord {
            id: LandlordId::from(self.id),
            daraja: DarajaConfig {
                consumer_key: self.consumer_key,
                consumer_secret: self.consumer_secret,
                passkey: self.passkey,
                environment: parse_environment(&self.environment)?,
                business_short_code: self.business_short_code,
                business_type: parse_business_type(&self.business_type)?,
                is_configured: self.is_configured,
                is_active: self.is_active,
                configured_at: self.configured_at,
                last_tested_at: self.last_tested_at,
            },
        })
    }
}

fn parse_environment(s: &str) -> DbResult<Environment> {
    match s {
        "sandbox" => Ok(Environment::Sandbox),
        "production" => Ok(Environment::Production),
        other => Err(DbError::Serialization(format!(
            "unknown environment column value: {other}"
        ))),
    }
}

fn parse_business_type(s: &str) -> DbResult<BusinessType> {
    match s {
        "paybill" => Ok(BusinessType::Paybill),
        "till" => Ok(BusinessType::Till),
        other => Err(DbError::Serialization(format!(
            "unknown business_type column value: {other}"
        ))),
    }
}

pub fn environment_column(env: Environment) -> &'static str {
    match env {
        Environment::Sandbox => "sandbox",
        Environment::Production => "production",
    }
}

pub fn business_type_column(bt: BusinessType) -> &'static str {
    match bt {
        BusinessType::Paybill => "paybill",
        BusinessType::Till => "till",
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTenant {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub rent_amount: i64,
    pub property_id: Option<Uuid>,
    pub unit_label: Option<String>,
    pub email: Option<String>,
}

impl DbTenant {
    pub fn into_domain(self) -> Tenant {
        Tenant {
            id: self.id.into(),
            full_name: self.full_name,
            phone: self.phone,
            rent_amount: self.rent_amount.max(0) as u64,
            property_id: self.property_id.map(PropertyId::from),
            unit_label: self.unit_label,
            email: self.email,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbIntent {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub tenant_id: Uuid,
    pub amount: i64,
    pub phone_number: String,
    pub payment_reference: String,
    pub account_reference: String,
    pub transaction_desc: String,
    pub business_short_code: String,
    pub business_type: String,
    pub bill_id: Option<String>,
    pub property_id: Option<Uuid>,
    pub status: String,
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub transaction_id: Option<String>,
    pub result_code: Option<i32>,
    pub result_desc: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub callback_received: bool,
    pub callback_data: Option<serde_json::Value>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl DbIntent {
    pub fn into_domain(self) -> DbResult<PaymentIntent> {
        Ok(PaymentIntent {
            id: self.id.into(),
            landlord_id: self.landlord_id.into(),
            tenant_id: self.tenant_id.into(),
            amount: self.amount.max(0) as u64,
            phone_number: self.phone_number,
            payment_reference: self.payment_reference,
            account_reference: self.account_reference,
            transaction_desc: self.transaction_desc,
            business_short_code: self.business_short_code,
            business_type: parse_business_type(&self.business_type)?,
            bill_id: self.bill_id,
            property_id: self.property_id.map(PropertyId::from),
            status: parse_intent_status(&self.status)?,
            merchant_request_id: self.merchant_request_id,
            checkout_request_id: self.checkout_request_id.map(Into::into),
            transaction_id: self.transaction_id,
            result_code: self.result_code,
            result_desc: self.result_desc,
            created_at: self.created_at,
            expires_at: self.expires_at,
            callback_received: self.callback_received,
            callback_data: self.callback_data,
            completed_at: self.completed_at,
        })
    }
}

fn parse_intent_status(s: &str) -> DbResult<IntentStatus> {
    match s {
        "pending" => Ok(IntentStatus::Pending),
        "success" => Ok(IntentStatus::Success),
        "failed" => Ok(IntentStatus::Failed),
        "timeout" => Ok(IntentStatus::Timeout),
        "cancelled" => Ok(IntentStatus::Cancelled),
        other => Err(DbError::Serialization(format!(
            "unknown intent status column value: {other}"
        ))),
    }
}

pub fn intent_status_column(status: IntentStatus) -> &'static str {
    match status {
        IntentStatus::Pending => "pending",
        IntentStatus::Success => "success",
        IntentStatus::Failed => "failed",
        IntentStatus::Timeout => "timeout",
        IntentStatus::Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbCallbackLog {
    pub id: Uuid,
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub result_code: i32,
    pub result_desc: String,
    pub raw_payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl DbCallbackLog {
    pub fn into_domain(self) -> CallbackLog {
        CallbackLog {
            id: self.id.into(),
            merchant_request_id: self.merchant_request_id,
            checkout_request_id: self.checkout_request_id,
            result_code: self.result_code,
            result_desc: self.result_desc,
            raw_payload: self.raw_payload,
            received_at: self.received_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPaymentHistory {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub landlord_id: Uuid,
    pub property_id: Option<Uuid>,
    pub amount: i64,
    pub payment_date: DateTime<Utc>,
    pub for_month: i16,
    pub for_year: i32,
    pub monthly_rent: i64,
    pub payment_method: String,
    pub status: String,
    pub notes: String,
    pub utility_charges: Json<Vec<UtilityCharge>>,
    pub total_utility_cost: f64,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbPaymentHistory {
    pub fn into_domain(self) -> DbResult<PaymentHistory> {
        Ok(PaymentHistory {
            id: self.id.into(),
            tenant_id: self.tenant_id.into(),
            landlord_id: self.landlord_id.into(),
            property_id: self.property_id.map(PropertyId::from),
            amount: self.amount.max(0) as u64,
            payment_date: self.payment_date,
            for_month: self.for_month.clamp(1, 12) as u8,
            for_year: self.for_year,
            monthly_rent: self.monthly_rent.max(0) as u64,
            payment_method: parse_payment_method(&self.payment_method)?,
            status: parse_payment_status(&self.status)?,
            notes: self.notes,
            utility_charges: self.utility_charges.0,
            total_utility_cost: self.total_utility_cost,
            transaction_id: self.transaction_id,
            created_at: self.created_at,
        })
    }
}

fn parse_payment_method(s: &str) -> DbResult<PaymentMethod> {
    match s {
        "mpesa" => Ok(PaymentMethod::Mpesa),
        "cash" => Ok(PaymentMethod::Cash),
        "manual" => Ok(PaymentMethod::Manual),
        other => Err(DbError::Serialization(format!(
            "unknown payment_method column value: {other}"
        ))),
    }
}

pub fn payment_method_column(m: PaymentMethod) -> &'static str {
    match m {
        PaymentMethod::Mpesa => "mpesa",
        PaymentMethod::Cash => "cash",
        PaymentMethod::Manual => "manual",
    }
}

fn parse_payment_status(s: &str) -> DbResult<PaymentStatus> {
    match s {
        "pending" => Ok(PaymentStatus::Pending),
        "partial" => Ok(PaymentStatus::Partial),
        "completed" => Ok(PaymentStatus::Completed),
        "overpaid" => Ok(PaymentStatus::Overpaid),
        other => Err(DbError::Serialization(format!(
            "unknown payment_history status column value: {other}"
        ))),
    }
}

pub fn payment_status_column(s: PaymentStatus) -> &'static str {
    match s {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Partial => "partial",
        PaymentStatus::Completed => "completed",
        PaymentStatus::Overpaid => "overpaid",
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbStatement {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub total_transactions: i32,
    pub matched_transactions: i32,
    pub status: String,
}

impl DbStatement {
    pub fn into_domain(self) -> DbResult<Statement> {
        use mpesa_types::statement::StatementPeriod;
        let statement_period = match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => Some(StatementPeriod { start, end }),
            _ => None,
        };
        Ok(Statement {
            id: self.id.into(),
            landlord_id: self.landlord_id.into(),
            file_name: self.file_name,
            upload_date: self.upload_date,
            statement_period,
            total_transactions: self.total_transactions.max(0) as usize,
            matched_transactions: self.matched_transactions.max(0) as usize,
            status: parse_statement_status(&self.status)?,
        })
    }
}

fn parse_statement_status(s: &str) -> DbResult<StatementStatus> {
    match s {
        "uploaded" => Ok(StatementStatus::Uploaded),
        "in_review" => Ok(StatementStatus::InReview),
        "approved" => Ok(StatementStatus::Approved),
        "deleted" => Ok(StatementStatus::Deleted),
        other => Err(DbError::Serialization(format!(
            "unknown statement status column value: {other}"
        ))),
    }
}

pub fn statement_status_column(s: StatementStatus) -> &'static str {
    match s {
        StatementStatus::Uploaded => "uploaded",
        StatementStatus::InReview => "in_review",
        StatementStatus::Approved => "approved",
        StatementStatus::Deleted => "deleted",
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTransactionMatch {
    pub id: Uuid,
    pub statement_id: Uuid,
    pub transaction: Json<ParsedTransaction>,
    pub matched_tenant: Option<Json<MatchCandidate>>,
    pub alternative_matches: Json<Vec<MatchCandidate>>,
    pub outcome: String,
    pub status: String,
    pub review_notes: Option<String>,
}

impl DbTransactionMatch {
    pub fn into_domain(self) -> DbResult<TransactionMatch> {
        Ok(TransactionMatch {
            id: self.id.into(),
            statement_id: self.statement_id.into(),
            transaction: self.transaction.0,
            matched_tenant: self.matched_tenant.map(|j| j.0),
            alternative_matches: self.alternative_matches.0,
            outcome: parse_match_outcome(&self.outcome)?,
            status: parse_match_status(&self.status)?,
            review_notes: self.review_notes,
        })
    }
}

fn parse_match_outcome(s: &str) -> DbResult<MatchOutcome> {
    match s {
        "matched" => Ok(MatchOutcome::Matched),
        "ambiguous" => Ok(MatchOutcome::Ambiguous),
        "no_match" => Ok(MatchOutcome::NoMatch),
        other => Err(DbError::Serialization(format!(
            "unknown match outcome column value: {other}"
        ))),
    }
}

pub fn match_outcome_column(o: MatchOutcome) -> &'static str {
    match o {
        MatchOutcome::Matched => "matched",
        MatchOutcome::Ambiguous => "ambiguous",
        MatchOutcome::NoMatch => "no_match",
    }
}

fn parse_match_status(s: &str) -> DbResult<MatchStatus> {
    match s {
        "pending" => Ok(MatchStatus::Pending),
        "approved" => Ok(MatchStatus::Approved),
        "rejected" => Ok(MatchStatus::Rejected),
        "manual" => Ok(MatchStatus::Manual),
        other => Err(DbError::Serialization(format!(
            "unknown match status column value: {other}"
        ))),
    }
}

pub fn match_status_column(s: MatchStatus) -> &'static str {
    match s {
        MatchStatus::Pending => "pending",
        MatchStatus::Approved => "approved",
        MatchStatus::Rejected => "rejected",
        MatchStatus::Manual => "manual",
    }
}
