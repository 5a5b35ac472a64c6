//! Shift configuration: reconciliation, direct edits and clock-time
//! resolution against the tenant's active configuration.

use chrono::NaiveTime;
use sqlx::PgPool;
use turnero_core::error::CoreError;
use turnero_core::shift_reconcile::{ShiftSpec, MAX_NAME_LEN};
use turnero_core::shift_resolver;
use turnero_core::time_window::TimeWindow;
use turnero_core::types::{DbId, TenantId};
use turnero_db::models::shift::{
    CreateShiftConfig, ReconcileOutcome, ShiftConfig, ShiftWindow, UpdateShiftWindow,
};
use turnero_db::repositories::{ShiftConfigRepo, ShiftWindowRepo};

use super::ensure_tenant;
use crate::error::AppResult;

pub struct ShiftRegistry;

impl ShiftRegistry {
    /// Upsert the desired shift list into the tenant's active configuration.
    ///
    /// Every entry is validated before anything is written, so a bad entry
    /// leaves no partial rows. Windows come back in submission order.
    pub async fn reconcile(
        pool: &PgPool,
        tenant_id: TenantId,
        desired: Vec<ShiftSpec>,
        actor: Option<DbId>,
    ) -> AppResult<ReconcileOutcome> {
        let desired = desired
            .into_iter()
            .map(ShiftSpec::normalized)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_tenant(pool, tenant_id).await?;

        let outcome = ShiftWindowRepo::reconcile(pool, tenant_id, desired, actor).await?;
        Ok(outcome)
    }

    /// The shift running at `time`, or `None` when the clock falls in a gap.
    pub async fn resolve(
        pool: &PgPool,
        tenant_id: TenantId,
        time: NaiveTime,
    ) -> AppResult<Option<ShiftWindow>> {
        let windows = ShiftWindowRepo::list_active(pool, tenant_id).await?;
        Ok(shift_resolver::resolve(&windows, time).cloned())
    }

    /// The shift a booking starting at `time` belongs to. Falls back to the
    /// first window in display order when nothing contains `time`.
    pub async fn resolve_at(
        pool: &PgPool,
        tenant_id: TenantId,
        time: NaiveTime,
    ) -> AppResult<Option<ShiftWindow>> {
        let windows = ShiftWindowRepo::list_active(pool, tenant_id).await?;
        Ok(shift_resolver::resolve_at(&windows, time).cloned())
    }

    pub async fn list_windows(pool: &PgPool, tenant_id: TenantId) -> AppResult<Vec<ShiftWindow>> {
        Ok(ShiftWindowRepo::list_active(pool, tenant_id).await?)
    }

    pub async fn list_configs(pool: &PgPool, tenant_id: TenantId) -> AppResult<Vec<ShiftConfig>> {
        Ok(ShiftConfigRepo::list(pool, tenant_id).await?)
    }

    /// Add an inactive configuration. Its windows are filled by reconciling
    /// after [`ShiftRegistry::activate_config`].
    pub async fn create_config(
        pool: &PgPool,
        tenant_id: TenantId,
        mut input: CreateShiftConfig,
        actor: Option<DbId>,
    ) -> AppResult<ShiftConfig> {
        input.name = checked_label("Configuration name", &input.name)?;
        input.scheme_kind = input
            .scheme_kind
            .as_deref()
            .map(|kind| checked_label("Scheme kind", kind))
            .transpose()?;
        ensure_tenant(pool, tenant_id).await?;

        let config = ShiftConfigRepo::create(pool, tenant_id, &input, actor).await?;
        tracing::info!(
            tenant_id,
            config_id = config.id,
            scheme_kind = %config.scheme_kind,
            "Shift configuration created",
        );
        Ok(config)
    }

    pub async fn activate_config(
        pool: &PgPool,
        tenant_id: TenantId,
        config_id: DbId,
    ) -> AppResult<ShiftConfig> {
        let config = ShiftConfigRepo::activate(pool, tenant_id, config_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ShiftConfig",
                id: config_id,
            })?;
        tracing::info!(tenant_id, config_id, "Shift configuration activated");
        Ok(config)
    }

    /// Patch one window. The code is immutable; a changed time bound is
    /// validated together with the bound that stays.
    pub async fn update_window(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
        mut input: UpdateShiftWindow,
    ) -> AppResult<ShiftWindow> {
        let current = find_window(pool, tenant_id, id).await?;

        if let Some(name) = input.name.as_mut() {
            *name = checked_label("Shift name", name)?;
        }
        if input.start_time.is_some() || input.end_time.is_some() {
            TimeWindow::new(
                input.start_time.unwrap_or(current.start_time),
                input.end_time.unwrap_or(current.end_time),
            )?;
        }

        ShiftWindowRepo::update(pool, tenant_id, id, &input)
            .await?
            .ok_or_else(|| window_not_found(id))
    }

    pub async fn delete_window(pool: &PgPool, tenant_id: TenantId, id: DbId) -> AppResult<()> {
        if !ShiftWindowRepo::delete(pool, tenant_id, id).await? {
            return Err(window_not_found(id));
        }
        tracing::info!(tenant_id, shift_window_id = id, "Shift window deleted");
        Ok(())
    }
}

/// Trim a display label and enforce `1..=MAX_NAME_LEN` characters.
fn checked_label(field: &str, raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Load a window owned by the tenant or fail with `NotFound`.
pub(crate) async fn find_window(
    pool: &PgPool,
    tenant_id: TenantId,
    id: DbId,
) -> AppResult<ShiftWindow> {
    ShiftWindowRepo::find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| window_not_found(id))
}

fn window_not_found(id: DbId) -> crate::error::AppError {
    CoreError::NotFound {
        entity: "ShiftWindow",
        id,
    }
    .into()
}
