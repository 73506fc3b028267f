//! Landlord Daraja configuration (§4.4 provisioning endpoints)

use chrono::Utc;
use mpesa_types::{DarajaConfig, Landlord, LandlordId};
use sqlx::PgPool;

use crate::error::{DbError, DbResult};
use crate::models::{business_type_column, environment_column, DbLandlord};

pub struct LandlordRepo {
    pool: PgPool,
}

impl LandlordRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: LandlordId) -> DbResult<Option<Landlord>> {
        let row = sqlx::query_as::<_, DbLandlord>(
            r#"
            SELECT id, consumer_key, consumer_secret, passkey, environment,
                   business_short_code, business_type, is_configured, is_active,
                   configured_at, last_tested_at
            FROM landlords
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DbLandlord::into_domain).transpose()
    }

    pub async fn require(&self, id: LandlordId) -> DbResult<Landlord> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("landlord {id}")))
    }

    /// Upserts the Daraja configuration, stamping `configured_at` (§4.4
    /// configure endpoint). Secrets are expected to already be ciphertext.
    pub async fn configure(&self, id: LandlordId, daraja: &DarajaConfig) -> DbResult<Landlord> {
        let row = sqlx::query_as::<_, DbLandlord>(
            r#"
            INSERT INTO landlords
                (id, consumer_key, consumer_secret, passkey, environment,
                 business_short_code, business_type, is_configured, is_active, configured_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, true, true, $8)
            ON CONFLICT (id) DO UPDATE SET
                consumer_key = EXCLUDED.consumer_key,
                consumer_secret = EXCLUDED.consumer_secret,
                passkey = EXCLUDED.passkey,
                environment = EXCLUDED.environment,
                business_short_code = EXCLUDED.business_short_code,
                business_type = EXCLUDED.business_type,
                is_configured = true,
                is_active = true,
                configured_at = EXCLUDED.configured_at
            RETURNING id, consumer_key, consumer_secret, passkey, environment,
                      business_short_code, business_type, is_configured, is_active,
                      configured_at, last_tested_at
            "#,
        )
        .bind(id.0)
        .bind(&daraja.consumer_key)
        .bind(&daraja.consumer_secret)
        .bind(&daraja.passkey)
        .bind(environment_column(daraja.environment))
        .bind(&daraja.business_short_code)
        .bind(business_type_column(daraja.business_type))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    pub async fn mark_tested(&self, id: LandlordId) -> DbResult<()> {
        sqlx::query("UPDATE landlords SET last_tested_at = $2 WHERE id = $1")
            .bind(id.0)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deactivates the gateway without dropping stored credentials, so a
    /// landlord can re-enable without re-entering secrets (§4.4).
    pub async fn deactivate(&self, id: LandlordId) -> DbResult<()> {
        sqlx::query("UPDATE landlords SET is_active = false WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
