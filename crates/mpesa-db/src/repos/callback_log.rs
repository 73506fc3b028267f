//! Append-only callback log (§3, §4.9: logging precedes intent mutation)

use chrono::Utc;
use mpesa_types::CallbackLog;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::DbCallbackLog;

pub struct CallbackLogRepo {
    pool: PgPool,
}

impl CallbackLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(
        &self,
        merchant_request_id: Option<String>,
        checkout_request_id: Option<String>,
        result_code: i32,
        result_desc: String,
        raw_payload: serde_json::Value,
    ) -> DbResult<CallbackLog> {
        let row = sqlx::query_as::<_, DbCallbackLog>(
            r#"
            INSERT INTO callback_logs
                (id, merchant_request_id, checkout_request_id, result_code, result_desc,
                 raw_payload, received_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6)
            RETURNING id, merchant_request_id, checkout_request_id, result_code, result_desc,
                      raw_payload, received_at
            "#,
        )
        .bind(merchant_request_id)
        .bind(checkout_request_id)
        .bind(result_code)
        .bind(result_desc)
        .bind(raw_payload)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_domain())
    }
}
