//! Postgres-backed `IntentStore` (C8, §5: payment intents are persisted,
//! not process-wide mutable state).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mpesa_intents::{IntentStore, TerminalFields};
use mpesa_types::{
    CheckoutRequestId, IntentId, IntentStatus, MpesaError, PaymentIntent, Result as MpesaResult,
};
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::{business_type_column, intent_status_column, DbIntent};

pub struct PgIntentStore {
    pool: PgPool,
}

impl PgIntentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntentStore for PgIntentStore {
    async fn create(&self, intent: PaymentIntent) -> MpesaResult<PaymentIntent> {
        sqlx::query(
            r#"
            INSERT INTO payment_intents
                (id, landlord_id, tenant_id, amount, phone_number, payment_reference,
                 account_reference, transaction_desc, business_short_code, business_type,
                 bill_id, property_id, status, merchant_request_id, checkout_request_id,
                 transaction_id, result_code, result_desc, created_at, expires_at,
                 callback_received, callback_data, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(intent.id.0)
        .bind(intent.landlord_id.0)
        .bind(intent.tenant_id.0)
        .bind(intent.amount as i64)
        .bind(&intent.phone_number)
        .bind(&intent.payment_reference)
        .bind(&intent.account_reference)
        .bind(&intent.transaction_desc)
        .bind(&intent.business_short_code)
        .bind(business_type_column(intent.business_type))
        .bind(&intent.bill_id)
        .bind(intent.property_id.map(|p| p.0))
        .bind(intent_status_column(intent.status))
        .bind(&intent.merchant_request_id)
        .bind(intent.checkout_request_id.as_ref().map(|c| c.0.clone()))
        .bind(&intent.transaction_id)
        .bind(intent.result_code)
        .bind(&intent.result_desc)
        .bind(intent.created_at)
        .bind(intent.expires_at)
        .bind(intent.callback_received)
        .bind(&intent.callback_data)
        .bind(intent.completed_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(intent)
    }

    async fn attach_checkout(
        &self,
        intent_id: IntentId,
        merchant_request_id: String,
        checkout_request_id: CheckoutRequestId,
    ) -> MpesaResult<PaymentIntent> {
        let row = sqlx::query_as::<_, DbIntent>(
            r#"
            UPDATE payment_intents
            SET merchant_request_id = $2, checkout_request_id = $3
            WHERE id = $1
            RETURNING id, landlord_id, tenant_id, amount, phone_number, payment_reference,
                      account_reference, transaction_desc, business_short_code, business_type,
                      bill_id, property_id, status, merchant_request_id, checkout_request_id,
                      transaction_id, result_code, result_desc, created_at, expires_at,
                      callback_received, callback_data, completed_at
            "#,
        )
        .bind(intent_id.0)
        .bind(&merchant_request_id)
        .bind(&checkout_request_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| MpesaError::NotFound(intent_id.to_string()))?;

        row.into_domain().map_err(MpesaError::from)
    }

    async fn find_by_checkout(&self, checkout: &CheckoutRequestId) -> Option<PaymentIntent> {
        let row = sqlx::query_as::<_, DbIntent>(
            r#"
            SELECT id, landlord_id, tenant_id, amount, phone_number, payment_reference,
                   account_reference, transaction_desc, business_short_code, business_type,
                   bill_id, property_id, status, merchant_request_id, checkout_request_id,
                   transaction_id, result_code, result_desc, created_at, expires_at,
                   callback_received, callback_data, completed_at
            FROM payment_intents
            WHERE checkout_request_id = $1
            "#,
        )
        .bind(&checkout.0)
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()?;

        row.into_domain().ok()
    }

    async fn find_by_id(&self, id: IntentId) -> Option<PaymentIntent> {
        let row = sqlx::query_as::<_, DbIntent>(
            r#"
            SELECT id, landlord_id, tenant_id, amount, phone_number, payment_reference,
                   account_reference, transaction_desc, business_short_code, business_type,
                   bill_id, property_id, status, merchant_request_id, checkout_request_id,
                   transaction_id, result_code, result_desc, created_at, expires_at,
                   callback_received, callback_data, completed_at
            FROM payment_intents
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()?;

        row.into_domain().ok()
    }

    async fn transition_terminal(
        &self,
        checkout: &CheckoutRequestId,
        new_status: IntentStatus,
        fields: TerminalFields,
    ) -> MpesaResult<bool> {
        debug_assert!(new_status.is_terminal());

        // Compare-and-set: the WHERE clause only matches a still-pending
        // row, so a redelivered callback's UPDATE affects zero rows (§5).
        let result = sqlx::query(
            r#"
            UPDATE payment_intents
            SET status = $2, transaction_id = $3, result_code = $4, result_desc = $5,
                callback_received = true, callback_data = $6, completed_at = $7
            WHERE checkout_request_id = $1 AND status = 'pending'
            "#,
        )
        .bind(&checkout.0)
        .bind(intent_status_column(new_status))
        .bind(&fields.transaction_id)
        .bind(fields.result_code)
        .bind(&fields.result_desc)
        .bind(&fields.callback_data)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            tracing::debug!(checkout_request_id = %checkout, "duplicate terminal transition, ignored");
        }
        Ok(result.rows_affected() > 0)
    }

    async fn reap_expired(&self, now: DateTime<Utc>) -> Vec<IntentId> {
        let ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            UPDATE payment_intents
            SET status = 'timeout', completed_at = $1
            WHERE status = 'pending' AND expires_at < $1
            RETURNING id
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();

        ids.into_iter().map(IntentId::from).collect()
    }
}
