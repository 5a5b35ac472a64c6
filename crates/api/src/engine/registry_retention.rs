//! Daily shift registries and their retention lifecycle
//! `present -> trashed -> purged`.

use chrono::Utc;
use sqlx::PgPool;
use turnero_core::error::CoreError;
use turnero_core::registry::{
    sweep_cutoff, validate_retention_days, RetentionState, SweepReport,
};
use turnero_core::types::{DbId, TenantId, Timestamp};
use turnero_db::models::registry::{CloseShift, DailyShiftRegistry};
use turnero_db::repositories::RegistryRepo;

use super::shift_registry::find_window;
use crate::error::{AppError, AppResult};

pub struct RegistryRetentionStore;

impl RegistryRetentionStore {
    /// Snapshot the active bookings of (shift, date) into a new registry and
    /// archive them. Only one live registry may exist per (shift, date).
    pub async fn close_shift(
        pool: &PgPool,
        tenant_id: TenantId,
        input: CloseShift,
        actor: DbId,
    ) -> AppResult<DailyShiftRegistry> {
        find_window(pool, tenant_id, input.shift_window_id).await?;
        let registry = RegistryRepo::close_shift(
            pool,
            tenant_id,
            input.shift_window_id,
            input.registry_date,
            actor,
        )
        .await?;
        tracing::info!(
            tenant_id,
            registry_id = registry.id,
            shift_window_id = input.shift_window_id,
            registry_date = %input.registry_date,
            total_bookings = registry.total_bookings,
            "Shift closed",
        );
        Ok(registry)
    }

    pub async fn get(pool: &PgPool, tenant_id: TenantId, id: DbId) -> AppResult<DailyShiftRegistry> {
        RegistryRepo::find_by_id(pool, tenant_id, id)
            .await?
            .ok_or_else(|| registry_not_found(id))
    }

    /// Default listing: live registries only.
    pub async fn list(pool: &PgPool, tenant_id: TenantId) -> AppResult<Vec<DailyShiftRegistry>> {
        Ok(RegistryRepo::list(pool, tenant_id).await?)
    }

    /// Trash view, most recently deleted first.
    pub async fn list_trashed(
        pool: &PgPool,
        tenant_id: TenantId,
    ) -> AppResult<Vec<DailyShiftRegistry>> {
        Ok(RegistryRepo::list_trashed(pool, tenant_id).await?)
    }

    /// `present -> trashed`. Trashing a trashed registry is rejected.
    pub async fn soft_delete(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
        deleted_by: DbId,
    ) -> AppResult<DailyShiftRegistry> {
        let current = find_any(pool, tenant_id, id).await?;
        current.retention()?.soft_delete(id, Utc::now(), deleted_by)?;

        if !RegistryRepo::soft_delete(pool, tenant_id, id, deleted_by).await? {
            let check = |s: RetentionState| s.soft_delete(id, Utc::now(), deleted_by);
            return Err(race_lost(pool, tenant_id, id, check).await);
        }
        tracing::info!(tenant_id, registry_id = id, deleted_by, "Registry moved to trash");
        find_any(pool, tenant_id, id).await
    }

    /// `trashed -> present`. Restoring a live registry is rejected.
    pub async fn restore(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> AppResult<DailyShiftRegistry> {
        let current = find_any(pool, tenant_id, id).await?;
        current.retention()?.restore(id)?;

        if !RegistryRepo::restore(pool, tenant_id, id).await? {
            return Err(race_lost(pool, tenant_id, id, |s| s.restore(id)).await);
        }
        tracing::info!(tenant_id, registry_id = id, "Registry restored");
        find_any(pool, tenant_id, id).await
    }

    /// Hard delete in any retention state.
    pub async fn purge(pool: &PgPool, tenant_id: TenantId, id: DbId) -> AppResult<()> {
        if !RegistryRepo::hard_delete(pool, tenant_id, id).await? {
            return Err(registry_not_found(id));
        }
        tracing::info!(tenant_id, registry_id = id, "Registry purged");
        Ok(())
    }

    /// Purge registries trashed more than `retention_days` before `now`.
    ///
    /// `tenant_id = None` sweeps every tenant. A failure on one entry is
    /// recorded in the report and the sweep moves on; entries restored while
    /// the sweep runs are skipped.
    pub async fn sweep_expired(
        pool: &PgPool,
        tenant_id: Option<TenantId>,
        retention_days: i64,
        now: Timestamp,
    ) -> AppResult<SweepReport> {
        let retention_days = validate_retention_days(retention_days)?;
        let cutoff = sweep_cutoff(now, retention_days);
        let expired = RegistryRepo::list_expired(pool, tenant_id, cutoff).await?;

        let mut report = SweepReport::default();
        for id in expired {
            match RegistryRepo::purge_expired(pool, id, cutoff).await {
                Ok(true) => report.purged += 1,
                Ok(false) => {
                    tracing::debug!(registry_id = id, "Registry no longer expired, skipped");
                }
                Err(e) => {
                    tracing::warn!(registry_id = id, error = %e, "Registry purge failed");
                    report.errors.push(format!("registry {id}: {e}"));
                }
            }
        }

        tracing::info!(
            tenant_id = ?tenant_id,
            retention_days,
            purged = report.purged,
            errors = report.errors.len(),
            "Registry retention sweep finished",
        );
        Ok(report)
    }
}

async fn find_any(pool: &PgPool, tenant_id: TenantId, id: DbId) -> AppResult<DailyShiftRegistry> {
    RegistryRepo::find_by_id_include_deleted(pool, tenant_id, id)
        .await?
        .ok_or_else(|| registry_not_found(id))
}

/// A guarded write matched no row: re-read and report why.
async fn race_lost(
    pool: &PgPool,
    tenant_id: TenantId,
    id: DbId,
    check: impl FnOnce(RetentionState) -> Result<RetentionState, CoreError>,
) -> AppError {
    let latest = match find_any(pool, tenant_id, id).await {
        Ok(latest) => latest,
        Err(e) => return e,
    };
    match latest.retention().and_then(check) {
        Err(e) => e.into(),
        Ok(_) => CoreError::Conflict(format!("Registry {id} changed concurrently")).into(),
    }
}

fn registry_not_found(id: DbId) -> AppError {
    CoreError::NotFound {
        entity: "DailyShiftRegistry",
        id,
    }
    .into()
}
