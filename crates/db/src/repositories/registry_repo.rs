//! Repository for the `daily_shift_registries` table.
//!
//! Retention columns follow the `Present | Trashed{at, by}` model: both
//! `deleted_at` and `deleted_by` NULL, or both set. Every query here is
//! tenant scoped except the global sweep helpers.

use chrono::NaiveDate;
use sqlx::PgPool;
use turnero_core::booking::{REGISTRATION_ACTIVE, REGISTRATION_ARCHIVED};
use turnero_core::registry::RegistryStats;
use turnero_core::types::{DbId, TenantId, Timestamp};

use crate::models::booking::Booking;
use crate::models::registry::DailyShiftRegistry;

const COLUMNS: &str = "id, tenant_id, shift_window_id, registry_date, booking_ids, \
                       total_bookings, completed_bookings, in_progress_bookings, staff_involved, \
                       booked_minutes, created_by, deleted_at, deleted_by, created_at, updated_at";

const BOOKING_COLUMNS: &str = "id, tenant_id, booking_date, start_time, end_time, court_id, \
                               staff_ids, shift_window_id, lifecycle, registration, \
                               sequence_number, notes, created_by, completed_at, created_at, \
                               updated_at";

pub struct RegistryRepo;

impl RegistryRepo {
    /// Close a shift: snapshot its active bookings into a new registry and
    /// archive those bookings, all in one transaction.
    ///
    /// A second live registry for the same (shift, date) violates
    /// `uq_daily_registries_tenant_shift_date` and nothing is archived.
    pub async fn close_shift(
        pool: &PgPool,
        tenant_id: TenantId,
        shift_window_id: DbId,
        date: NaiveDate,
        created_by: DbId,
    ) -> Result<DailyShiftRegistry, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let booking_query = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE tenant_id = $1 AND shift_window_id = $2 AND booking_date = $3
               AND registration = $4
             ORDER BY sequence_number ASC
             FOR UPDATE"
        );
        let bookings = sqlx::query_as::<_, Booking>(&booking_query)
            .bind(tenant_id)
            .bind(shift_window_id)
            .bind(date)
            .bind(REGISTRATION_ACTIVE)
            .fetch_all(&mut *tx)
            .await?;

        let snapshots = bookings
            .iter()
            .map(Booking::snapshot)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let stats = RegistryStats::from_bookings(&snapshots);

        let insert = format!(
            "INSERT INTO daily_shift_registries
                (tenant_id, shift_window_id, registry_date, booking_ids, total_bookings,
                 completed_bookings, in_progress_bookings, staff_involved, booked_minutes,
                 created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let registry = sqlx::query_as::<_, DailyShiftRegistry>(&insert)
            .bind(tenant_id)
            .bind(shift_window_id)
            .bind(date)
            .bind(&stats.booking_ids)
            .bind(stats.total_bookings)
            .bind(stats.completed_bookings)
            .bind(stats.in_progress_bookings)
            .bind(stats.staff_involved)
            .bind(stats.booked_minutes)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE bookings SET registration = $2 WHERE id = ANY($1)")
            .bind(&stats.booking_ids)
            .bind(REGISTRATION_ARCHIVED)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(registry)
    }

    /// Find a live registry. Trashed rows are not returned.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> Result<Option<DailyShiftRegistry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM daily_shift_registries
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, DailyShiftRegistry>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a registry in any retention state.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> Result<Option<DailyShiftRegistry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM daily_shift_registries WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, DailyShiftRegistry>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Live registries, newest date first.
    pub async fn list(
        pool: &PgPool,
        tenant_id: TenantId,
    ) -> Result<Vec<DailyShiftRegistry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM daily_shift_registries
             WHERE tenant_id = $1 AND deleted_at IS NULL
             ORDER BY registry_date DESC, id DESC"
        );
        sqlx::query_as::<_, DailyShiftRegistry>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Trashed registries only, most recently deleted first.
    pub async fn list_trashed(
        pool: &PgPool,
        tenant_id: TenantId,
    ) -> Result<Vec<DailyShiftRegistry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM daily_shift_registries
             WHERE tenant_id = $1 AND deleted_at IS NOT NULL
             ORDER BY deleted_at DESC, id DESC"
        );
        sqlx::query_as::<_, DailyShiftRegistry>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Move a live registry to the trash. Returns `true` if a row changed.
    pub async fn soft_delete(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
        deleted_by: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE daily_shift_registries SET deleted_at = NOW(), deleted_by = $3
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(deleted_by)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bring a trashed registry back. Returns `true` if a row changed.
    pub async fn restore(pool: &PgPool, tenant_id: TenantId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE daily_shift_registries SET deleted_at = NULL, deleted_by = NULL
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a registry in any state. Returns `true` if a row was removed.
    pub async fn hard_delete(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM daily_shift_registries WHERE id = $1 AND tenant_id = $2")
                .bind(id)
                .bind(tenant_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ids of registries trashed strictly before `cutoff`, oldest first.
    /// `None` scans every tenant.
    pub async fn list_expired(
        pool: &PgPool,
        tenant_id: Option<TenantId>,
        cutoff: Timestamp,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM daily_shift_registries
             WHERE deleted_at IS NOT NULL AND deleted_at < $1
               AND ($2::BIGINT IS NULL OR tenant_id = $2)
             ORDER BY deleted_at ASC, id ASC",
        )
        .bind(cutoff)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Purge one expired entry. The trashed-before-cutoff condition is
    /// re-checked so a registry restored mid-sweep survives.
    pub async fn purge_expired(
        pool: &PgPool,
        id: DbId,
        cutoff: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM daily_shift_registries
             WHERE id = $1 AND deleted_at IS NOT NULL AND deleted_at < $2",
        )
        .bind(id)
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
