//! Settled payment records (§3, §4.9 C9 branch: update an existing bill vs.
//! derive a new record from the tenant/property snapshot)

use chrono::{DateTime, Utc};
use mpesa_types::{
    PaymentHistory, PaymentHistoryId, PaymentMethod, PaymentStatus, PropertyId, TenantId,
    UtilityCharge,
};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::{DbError, DbResult};
use crate::models::{payment_method_column, payment_status_column, DbPaymentHistory};

pub struct PaymentHistoryRepo {
    pool: PgPool,
}

impl PaymentHistoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: PaymentHistoryId) -> DbResult<Option<PaymentHistory>> {
        let row = sqlx::query_as::<_, DbPaymentHistory>(
            r#"
            SELECT id, tenant_id, landlord_id, property_id, amount, payment_date, for_month,
                   for_year, monthly_rent, payment_method, status, notes, utility_charges,
                   total_utility_cost, transaction_id, created_at
            FROM payment_history
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DbPaymentHistory::into_domain).transpose()
    }

    pub async fn require(&self, id: PaymentHistoryId) -> DbResult<PaymentHistory> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("payment history {id}")))
    }

    /// Creates a new record, not tied to a pre-existing bill (§4.9, the
    /// derive-from-tenant-snapshot branch).
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        tenant_id: TenantId,
        landlord_id: mpesa_types::LandlordId,
        property_id: Option<PropertyId>,
        amount: u64,
        payment_date: DateTime<Utc>,
        for_month: u8,
        for_year: i32,
        monthly_rent: u64,
        payment_method: PaymentMethod,
        status: PaymentStatus,
        notes: String,
        transaction_id: Option<String>,
    ) -> DbResult<PaymentHistory> {
        let row = sqlx::query_as::<_, DbPaymentHistory>(
            r#"
            INSERT INTO payment_history
                (id, tenant_id, landlord_id, property_id, amount, payment_date, for_month,
                 for_year, monthly_rent, payment_method, status, notes, utility_charges,
                 total_utility_cost, transaction_id, created_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 0.0,
                    $13, $14)
            RETURNING id, tenant_id, landlord_id, property_id, amount, payment_date, for_month,
                      for_year, monthly_rent, payment_method, status, notes, utility_charges,
                      total_utility_cost, transaction_id, created_at
            "#,
        )
        .bind(tenant_id.0)
        .bind(landlord_id.0)
        .bind(property_id.map(|p| p.0))
        .bind(amount as i64)
        .bind(payment_date)
        .bind(for_month as i16)
        .bind(for_year)
        .bind(monthly_rent as i64)
        .bind(payment_method_column(payment_method))
        .bind(payment_status_column(status))
        .bind(notes)
        .bind(Json(Vec::<UtilityCharge>::new()))
        .bind(transaction_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    /// Settles a pre-existing bill record (§4.9, the update-existing-bill
    /// branch) rather than deriving a new one.
    pub async fn mark_settled(
        &self,
        id: PaymentHistoryId,
        amount: u64,
        status: PaymentStatus,
        transaction_id: Option<String>,
        note: &str,
    ) -> DbResult<PaymentHistory> {
        let mut history = self.require(id).await?;
        history.amount = amount;
        history.status = status;
        history.transaction_id = transaction_id.clone();
        history.append_note(note);

        let row = sqlx::query_as::<_, DbPaymentHistory>(
            r#"
            UPDATE payment_history
            SET amount = $2, status = $3, transaction_id = $4, notes = $5
            WHERE id = $1
            RETURNING id, tenant_id, landlord_id, property_id, amount, payment_date, for_month,
                      for_year, monthly_rent, payment_method, status, notes, utility_charges,
                      total_utility_cost, transaction_id, created_at
            "#,
        )
        .bind(id.0)
        .bind(amount as i64)
        .bind(payment_status_column(status))
        .bind(transaction_id)
        .bind(&history.notes)
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }
}
