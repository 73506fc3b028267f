//! Statement and transaction-match persistence (§4.11: delete cascades to
//! matches but leaves approved `payment_history` rows untouched)

use chrono::Utc;
use mpesa_types::statement::{
    MatchCandidate, MatchOutcome, MatchStatus, ParsedTransaction, Statement, StatementPeriod,
    StatementStatus, TransactionMatch,
};
use mpesa_types::{LandlordId, MatchId, StatementId};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::{DbError, DbResult};
use crate::models::{
    match_outcome_column, match_status_column, statement_status_column, DbStatement,
    DbTransactionMatch,
};

pub struct StatementRepo {
    pool: PgPool,
}

impl StatementRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        landlord_id: LandlordId,
        file_name: String,
        statement_period: Option<StatementPeriod>,
        total_transactions: usize,
    ) -> DbResult<Statement> {
        let row = sqlx::query_as::<_, DbStatement>(
            r#"
            INSERT INTO statements
                (id, landlord_id, file_name, upload_date, period_start, period_end,
                 total_transactions, matched_transactions, status)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, 0, 'uploaded')
            RETURNING id, landlord_id, file_name, upload_date, period_start, period_end,
                      total_transactions, matched_transactions, status
            "#,
        )
        .bind(landlord_id.0)
        .bind(file_name)
        .bind(Utc::now())
        .bind(statement_period.as_ref().map(|p| p.start))
        .bind(statement_period.as_ref().map(|p| p.end))
        .bind(total_transactions as i32)
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    pub async fn find(&self, id: StatementId) -> DbResult<Option<Statement>> {
        let row = sqlx::query_as::<_, DbStatement>(
            r#"
            SELECT id, landlord_id, file_name, upload_date, period_start, period_end,
                   total_transactions, matched_transactions, status
            FROM statements
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DbStatement::into_domain).transpose()
    }

    pub async fn list_for_landlord(&self, landlord_id: LandlordId) -> DbResult<Vec<Statement>> {
        let rows = sqlx::query_as::<_, DbStatement>(
            r#"
            SELECT id, landlord_id, file_name, upload_date, period_start, period_end,
                   total_transactions, matched_transactions, status
            FROM statements
            WHERE landlord_id = $1 AND status != 'deleted'
            ORDER BY upload_date DESC
            "#,
        )
        .bind(landlord_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbStatement::into_domain).collect()
    }

    pub async fn set_matched_count(&self, id: StatementId, matched: usize) -> DbResult<()> {
        sqlx::query("UPDATE statements SET matched_transactions = $2, status = 'in_review' WHERE id = $1")
            .bind(id.0)
            .bind(matched as i32)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Soft-deletes the statement. Its `TransactionMatch` rows cascade via
    /// the `ON DELETE CASCADE` foreign key; `payment_history` rows created
    /// from approved matches reference the tenant, not the statement, so
    /// they are unaffected (§4.11).
    pub async fn soft_delete(&self, id: StatementId) -> DbResult<()> {
        sqlx::query("UPDATE statements SET status = 'deleted' WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct TransactionMatchRepo {
    pool: PgPool,
}

impl TransactionMatchRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        statement_id: StatementId,
        transaction: ParsedTransaction,
        matched_tenant: Option<MatchCandidate>,
        alternative_matches: Vec<MatchCandidate>,
        outcome: MatchOutcome,
    ) -> DbResult<TransactionMatch> {
        let row = sqlx::query_as::<_, DbTransactionMatch>(
            r#"
            INSERT INTO transaction_matches
                (id, statement_id, transaction, matched_tenant, alternative_matches, outcome,
                 status, review_notes)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, 'pending', NULL)
            RETURNING id, statement_id, transaction, matched_tenant, alternative_matches,
                      outcome, status, review_notes
            "#,
        )
        .bind(statement_id.0)
        .bind(Json(transaction))
        .bind(matched_tenant.map(Json))
        .bind(Json(alternative_matches))
        .bind(match_outcome_column(outcome))
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    pub async fn find(&self, id: MatchId) -> DbResult<Option<TransactionMatch>> {
        let row = sqlx::query_as::<_, DbTransactionMatch>(
            r#"
            SELECT id, statement_id, transaction, matched_tenant, alternative_matches, outcome,
                   status, review_notes
            FROM transaction_matches
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DbTransactionMatch::into_domain).transpose()
    }

    pub async fn require(&self, id: MatchId) -> DbResult<TransactionMatch> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("transaction match {id}")))
    }

    pub async fn list_for_statement(&self, statement_id: StatementId) -> DbResult<Vec<TransactionMatch>> {
        let rows = sqlx::query_as::<_, DbTransactionMatch>(
            r#"
            SELECT id, statement_id, transaction, matched_tenant, alternative_matches, outcome,
                   status, review_notes
            FROM transaction_matches
            WHERE statement_id = $1
            "#,
        )
        .bind(statement_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbTransactionMatch::into_domain).collect()
    }

    /// §4.10 approve/reject/manual-match transitions. `matched_tenant` is
    /// replaced wholesale on manual re-binding.
    pub async fn set_status(
        &self,
        id: MatchId,
        status: MatchStatus,
        matched_tenant: Option<MatchCandidate>,
        review_notes: Option<String>,
    ) -> DbResult<TransactionMatch> {
        let row = if let Some(candidate) = matched_tenant {
            sqlx::query_as::<_, DbTransactionMatch>(
                r#"
                UPDATE transaction_matches
                SET status = $2, matched_tenant = $3, review_notes = $4
                WHERE id = $1
                RETURNING id, statement_id, transaction, matched_tenant, alternative_matches,
                          outcome, status, review_notes
                "#,
            )
            .bind(id.0)
            .bind(match_status_column(status))
            .bind(Json(candidate))
            .bind(review_notes)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, DbTransactionMatch>(
                r#"
                UPDATE transaction_matches
                SET status = $2, review_notes = $3
                WHERE id = $1
                RETURNING id, statement_id, transaction, matched_tenant, alternative_matches,
                          outcome, status, review_notes
                "#,
            )
            .bind(id.0)
            .bind(match_status_column(status))
            .bind(review_notes)
            .fetch_one(&self.pool)
            .await?
        };

        row.into_domain()
    }
}
