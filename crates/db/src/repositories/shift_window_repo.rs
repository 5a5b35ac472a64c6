//! Repository for the `shift_windows` table, including upsert-only
//! reconciliation.

use sqlx::{PgConnection, PgPool};
use turnero_core::locking::{scope_lock_key, NS_SHIFT_CONFIG};
use turnero_core::shift_reconcile::{self, DuplicateGroup, ShiftSpec, StoredWindow, WindowOp};
use turnero_core::types::{DbId, TenantId, Timestamp};

use super::advisory_xact_lock;
use super::shift_config_repo::ShiftConfigRepo;
use crate::models::shift::{ReconcileOutcome, ShiftWindow, UpdateShiftWindow};

const COLUMNS: &str = "id, config_id, code, name, start_time, end_time, color, sort_order, \
                       is_active, created_at, updated_at";

/// Same columns qualified with the `w` alias, for joins against `shift_configs`.
const W_COLUMNS: &str = "w.id, w.config_id, w.code, w.name, w.start_time, w.end_time, w.color, \
                         w.sort_order, w.is_active, w.created_at, w.updated_at";

pub struct ShiftWindowRepo;

impl ShiftWindowRepo {
    /// Active windows of the tenant's active configuration in display order
    /// (`sort_order ASC, name ASC`). This is the set the resolver walks.
    pub async fn list_active(
        pool: &PgPool,
        tenant_id: TenantId,
    ) -> Result<Vec<ShiftWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {W_COLUMNS} FROM shift_windows w
             JOIN shift_configs c ON c.id = w.config_id
             WHERE c.tenant_id = $1 AND c.is_active AND w.is_active
             ORDER BY w.sort_order ASC, w.name ASC, w.id ASC"
        );
        sqlx::query_as::<_, ShiftWindow>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Every window of one configuration, inactive ones included.
    pub async fn list_for_config(
        pool: &PgPool,
        tenant_id: TenantId,
        config_id: DbId,
    ) -> Result<Vec<ShiftWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {W_COLUMNS} FROM shift_windows w
             JOIN shift_configs c ON c.id = w.config_id
             WHERE c.tenant_id = $1 AND w.config_id = $2
             ORDER BY w.sort_order ASC, w.name ASC, w.id ASC"
        );
        sqlx::query_as::<_, ShiftWindow>(&query)
            .bind(tenant_id)
            .bind(config_id)
            .fetch_all(pool)
            .await
    }

    /// Find a window owned by the tenant, from any of its configurations.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> Result<Option<ShiftWindow>, sqlx::Error> {
        let query = format!(
            "SELECT {W_COLUMNS} FROM shift_windows w
             JOIN shift_configs c ON c.id = w.config_id
             WHERE w.id = $1 AND c.tenant_id = $2"
        );
        sqlx::query_as::<_, ShiftWindow>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Patch a single window. Times must already be validated as a pair.
    pub async fn update(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
        input: &UpdateShiftWindow,
    ) -> Result<Option<ShiftWindow>, sqlx::Error> {
        let query = format!(
            "UPDATE shift_windows w SET
                name = COALESCE($3, w.name),
                start_time = COALESCE($4, w.start_time),
                end_time = COALESCE($5, w.end_time),
                color = COALESCE($6, w.color),
                sort_order = COALESCE($7, w.sort_order),
                is_active = COALESCE($8, w.is_active)
             FROM shift_configs c
             WHERE w.id = $1 AND c.id = w.config_id AND c.tenant_id = $2
             RETURNING {W_COLUMNS}"
        );
        sqlx::query_as::<_, ShiftWindow>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(&input.color)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a window. Bookings keep existing with no shift; attendance for
    /// the window cascades. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, tenant_id: TenantId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM shift_windows w USING shift_configs c
             WHERE w.id = $1 AND c.id = w.config_id AND c.tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reconcile the desired shift list against the tenant's active
    /// configuration in one transaction.
    ///
    /// The tenant must exist and `desired` must already be normalized.
    /// Concurrent calls for one tenant queue on the per-tenant shift lock, so
    /// two runs can never both decide to create the same code.
    pub async fn reconcile(
        pool: &PgPool,
        tenant_id: TenantId,
        desired: Vec<ShiftSpec>,
        actor: Option<DbId>,
    ) -> Result<ReconcileOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        advisory_xact_lock(&mut *tx, scope_lock_key(NS_SHIFT_CONFIG, tenant_id)).await?;

        let config = ShiftConfigRepo::ensure_active(&mut *tx, tenant_id, actor).await?;

        let stored: Vec<StoredWindow> = sqlx::query_as::<_, (DbId, String, Timestamp)>(
            "SELECT id, code, created_at FROM shift_windows WHERE config_id = $1",
        )
        .bind(config.id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(id, code, created_at)| StoredWindow {
            id,
            code,
            created_at,
        })
        .collect();

        let plan = shift_reconcile::plan(&stored, desired);

        let mut attendance_dropped = 0;
        let mut registries_detached = 0;
        for group in &plan.duplicates {
            let loss = collapse_duplicates(&mut *tx, group).await?;
            tracing::warn!(
                tenant_id,
                config_id = config.id,
                code = %group.code,
                keep = group.keep,
                removed = ?group.remove,
                attendance_dropped = loss.attendance_dropped,
                registries_detached = loss.registries_detached,
                "Collapsed duplicate shift windows",
            );
            attendance_dropped += loss.attendance_dropped;
            registries_detached += loss.registries_detached;
        }

        let mut windows = Vec::with_capacity(plan.ops.len());
        for op in &plan.ops {
            let window = match op {
                WindowOp::Update { id, spec } => update_from_spec(&mut *tx, *id, spec).await?,
                WindowOp::Create { spec } => insert_from_spec(&mut *tx, config.id, spec).await?,
            };
            windows.push(window);
        }

        tx.commit().await?;

        tracing::info!(
            tenant_id,
            config_id = config.id,
            created = plan.creates(),
            updated = plan.updates(),
            duplicates = plan.duplicates.len(),
            "Shift windows reconciled",
        );

        Ok(ReconcileOutcome {
            config_id: config.id,
            windows,
            created: plan.creates(),
            updated: plan.updates(),
            duplicates_removed: plan.duplicates,
            attendance_dropped,
            registries_detached,
        })
    }
}

/// References that could not follow the survivor of a duplicate group.
struct CollapseLoss {
    /// Attendance rows removed by `ON DELETE CASCADE`.
    attendance_dropped: u64,
    /// Registries whose shift became NULL through `ON DELETE SET NULL`.
    registries_detached: u64,
}

/// Re-point references from the removed rows to the survivor, then delete
/// the removed rows. Rows that would collide with a reference the survivor
/// already has are left behind for the foreign key actions and counted.
async fn collapse_duplicates(
    conn: &mut PgConnection,
    group: &DuplicateGroup,
) -> Result<CollapseLoss, sqlx::Error> {
    for removed in &group.remove {
        sqlx::query("UPDATE bookings SET shift_window_id = $1 WHERE shift_window_id = $2")
            .bind(group.keep)
            .bind(removed)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            "UPDATE daily_shift_registries r SET shift_window_id = $1
             WHERE r.shift_window_id = $2
               AND (r.deleted_at IS NOT NULL OR NOT EXISTS (
                    SELECT 1 FROM daily_shift_registries k
                    WHERE k.shift_window_id = $1
                      AND k.tenant_id = r.tenant_id
                      AND k.registry_date = r.registry_date
                      AND k.deleted_at IS NULL))",
        )
        .bind(group.keep)
        .bind(removed)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "UPDATE attendance_records a SET shift_window_id = $1
             WHERE a.shift_window_id = $2
               AND NOT EXISTS (
                    SELECT 1 FROM attendance_records k
                    WHERE k.shift_window_id = $1
                      AND k.staff_id = a.staff_id
                      AND k.attendance_date = a.attendance_date)",
        )
        .bind(group.keep)
        .bind(removed)
        .execute(&mut *conn)
        .await?;
    }

    let (attendance_dropped, registries_detached): (i64, i64) = sqlx::query_as(
        "SELECT
            (SELECT COUNT(*) FROM attendance_records WHERE shift_window_id = ANY($1)),
            (SELECT COUNT(*) FROM daily_shift_registries WHERE shift_window_id = ANY($1))",
    )
    .bind(&group.remove)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM shift_windows WHERE id = ANY($1)")
        .bind(&group.remove)
        .execute(&mut *conn)
        .await?;
    Ok(CollapseLoss {
        attendance_dropped: attendance_dropped as u64,
        registries_detached: registries_detached as u64,
    })
}

async fn update_from_spec(
    conn: &mut PgConnection,
    id: DbId,
    spec: &ShiftSpec,
) -> Result<ShiftWindow, sqlx::Error> {
    let query = format!(
        "UPDATE shift_windows SET
            name = $2,
            start_time = $3,
            end_time = $4,
            color = $5,
            sort_order = $6,
            is_active = $7
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, ShiftWindow>(&query)
        .bind(id)
        .bind(&spec.name)
        .bind(spec.start_time)
        .bind(spec.end_time)
        .bind(&spec.color)
        .bind(spec.sort_order)
        .bind(spec.is_active)
        .fetch_one(conn)
        .await
}

async fn insert_from_spec(
    conn: &mut PgConnection,
    config_id: DbId,
    spec: &ShiftSpec,
) -> Result<ShiftWindow, sqlx::Error> {
    let query = format!(
        "INSERT INTO shift_windows
            (config_id, code, name, start_time, end_time, color, sort_order, is_active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, ShiftWindow>(&query)
        .bind(config_id)
        .bind(&spec.code)
        .bind(&spec.name)
        .bind(spec.start_time)
        .bind(spec.end_time)
        .bind(&spec.color)
        .bind(spec.sort_order)
        .bind(spec.is_active)
        .fetch_one(conn)
        .await
}
