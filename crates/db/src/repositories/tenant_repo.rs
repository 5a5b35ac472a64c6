//! Repository for the `tenants` table.

use sqlx::PgPool;
use turnero_core::types::TenantId;

use crate::models::tenant::{CreateTenant, Tenant};

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct TenantRepo;

impl TenantRepo {
    pub async fn create(pool: &PgPool, input: &CreateTenant) -> Result<Tenant, sqlx::Error> {
        let query = format!("INSERT INTO tenants (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: TenantId) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE id = $1");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: TenantId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM tenants WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
