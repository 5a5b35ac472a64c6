//! Repository for the `shift_configs` table.
//!
//! Activation and implicit creation run under the per-tenant shift lock so
//! they serialize with reconciliation.

use sqlx::{PgConnection, PgPool};
use turnero_core::locking::{scope_lock_key, NS_SHIFT_CONFIG};
use turnero_core::types::{DbId, TenantId};

use super::advisory_xact_lock;
use crate::models::shift::{CreateShiftConfig, ShiftConfig, SCHEME_CUSTOM};

const COLUMNS: &str =
    "id, tenant_id, name, scheme_kind, is_active, created_by, created_at, updated_at";

/// Name given to a configuration created implicitly on first reconcile.
pub const DEFAULT_CONFIG_NAME: &str = "Default";

pub struct ShiftConfigRepo;

impl ShiftConfigRepo {
    /// Create an inactive configuration.
    pub async fn create(
        pool: &PgPool,
        tenant_id: TenantId,
        input: &CreateShiftConfig,
        created_by: Option<DbId>,
    ) -> Result<ShiftConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO shift_configs (tenant_id, name, scheme_kind, is_active, created_by)
             VALUES ($1, $2, COALESCE($3, '{SCHEME_CUSTOM}'), false, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShiftConfig>(&query)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.scheme_kind)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// List a tenant's configurations, active first.
    pub async fn list(pool: &PgPool, tenant_id: TenantId) -> Result<Vec<ShiftConfig>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shift_configs WHERE tenant_id = $1
             ORDER BY is_active DESC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ShiftConfig>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_active(
        pool: &PgPool,
        tenant_id: TenantId,
    ) -> Result<Option<ShiftConfig>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM shift_configs WHERE tenant_id = $1 AND is_active");
        sqlx::query_as::<_, ShiftConfig>(&query)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Make `config_id` the tenant's only active configuration.
    ///
    /// Returns `None` if the configuration does not belong to the tenant.
    pub async fn activate(
        pool: &PgPool,
        tenant_id: TenantId,
        config_id: DbId,
    ) -> Result<Option<ShiftConfig>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        advisory_xact_lock(&mut *tx, scope_lock_key(NS_SHIFT_CONFIG, tenant_id)).await?;

        let owned: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM shift_configs WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(config_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(None);
        }

        // Deactivate first: the partial unique index forbids two active rows.
        sqlx::query(
            "UPDATE shift_configs SET is_active = false
             WHERE tenant_id = $1 AND is_active AND id <> $2",
        )
        .bind(tenant_id)
        .bind(config_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE shift_configs SET is_active = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        let config = sqlx::query_as::<_, ShiftConfig>(&query)
            .bind(config_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(config))
    }

    /// Return the active configuration, creating a default one if the
    /// tenant has none. Caller must hold the per-tenant shift lock.
    pub(crate) async fn ensure_active(
        conn: &mut PgConnection,
        tenant_id: TenantId,
        created_by: Option<DbId>,
    ) -> Result<ShiftConfig, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shift_configs WHERE tenant_id = $1 AND is_active FOR UPDATE"
        );
        if let Some(config) = sqlx::query_as::<_, ShiftConfig>(&query)
            .bind(tenant_id)
            .fetch_optional(&mut *conn)
            .await?
        {
            return Ok(config);
        }

        tracing::info!(tenant_id, "Creating default shift configuration");
        let insert = format!(
            "INSERT INTO shift_configs (tenant_id, name, scheme_kind, is_active, created_by)
             VALUES ($1, $2, '{SCHEME_CUSTOM}', true, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShiftConfig>(&insert)
            .bind(tenant_id)
            .bind(DEFAULT_CONFIG_NAME)
            .bind(created_by)
            .fetch_one(&mut *conn)
            .await
    }
}
