//! Tenant snapshot reads (§3: tenant CRUD is out of scope, the core only
//! reads the set needed to drive matching and STK initiation).

use mpesa_types::{LandlordId, Tenant, TenantId};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::DbTenant;

pub struct TenantRepo {
    pool: PgPool,
}

impl TenantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: TenantId) -> DbResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, DbTenant>(
            "SELECT id, landlord_id, full_name, phone, rent_amount, property_id, unit_label, email \
             FROM tenants WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DbTenant::into_domain))
    }

    /// The snapshot a statement review matches against (§4.7).
    pub async fn list_for_landlord(&self, landlord_id: LandlordId) -> DbResult<Vec<Tenant>> {
        let rows = sqlx::query_as::<_, DbTenant>(
            "SELECT id, landlord_id, full_name, phone, rent_amount, property_id, unit_label, email \
             FROM tenants WHERE landlord_id = $1",
        )
        .bind(landlord_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DbTenant::into_domain).collect())
    }
}
