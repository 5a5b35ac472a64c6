//! Repository for the `attendance_records` table.
//!
//! Recording an arrival and ranking a (shift, date) share one advisory lock,
//! so a ranking run always sees a stable set of records.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use turnero_core::attendance::compute_ranks;
use turnero_core::locking::{day_scoped_lock_key, NS_ATTENDANCE};
use turnero_core::types::{DbId, TenantId};

use super::advisory_xact_lock;
use crate::models::attendance::{AttendanceRecord, CreateAttendance};

const COLUMNS: &str = "id, tenant_id, staff_id, shift_window_id, attendance_date, arrived_at, \
                       tasks_completed, prior_day_shift_count, rank, created_at, updated_at";

pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Record an arrival. When `prior_day_shift_count` is not supplied it is
    /// the number of records the staff member has on the previous day.
    ///
    /// A second record for the same (staff, shift, date) violates
    /// `uq_attendance_staff_shift_date`.
    pub async fn create(
        pool: &PgPool,
        tenant_id: TenantId,
        input: &CreateAttendance,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_shift_day(&mut *tx, input.shift_window_id, input.attendance_date).await?;

        let prior = match input.prior_day_shift_count {
            Some(count) => count,
            None => prior_day_count(&mut *tx, tenant_id, input.staff_id, input.attendance_date).await?,
        };

        let query = format!(
            "INSERT INTO attendance_records
                (tenant_id, staff_id, shift_window_id, attendance_date, arrived_at,
                 tasks_completed, prior_day_shift_count)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6, $7)
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(tenant_id)
            .bind(input.staff_id)
            .bind(input.shift_window_id)
            .bind(input.attendance_date)
            .bind(input.arrived_at)
            .bind(input.tasks_completed)
            .bind(prior)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    pub async fn set_tasks_completed(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
        tasks_completed: bool,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance_records SET tasks_completed = $3
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(tasks_completed)
            .fetch_optional(pool)
            .await
    }

    /// Records of one (shift, date), ranked ones first in rank order.
    pub async fn list_for_shift_day(
        pool: &PgPool,
        tenant_id: TenantId,
        shift_window_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE tenant_id = $1 AND shift_window_id = $2 AND attendance_date = $3
             ORDER BY rank ASC NULLS LAST, arrived_at ASC, id ASC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(tenant_id)
            .bind(shift_window_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    /// All records of the tenant in an inclusive date range.
    pub async fn list_range(
        pool: &PgPool,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE tenant_id = $1 AND attendance_date BETWEEN $2 AND $3
             ORDER BY attendance_date ASC, shift_window_id ASC, id ASC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(tenant_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Recompute and persist ranks `1..=N` for one (shift, date), returning
    /// the records in rank order. Previous ranks are overwritten.
    pub async fn rank(
        pool: &PgPool,
        tenant_id: TenantId,
        shift_window_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_shift_day(&mut *tx, shift_window_id, date).await?;

        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE tenant_id = $1 AND shift_window_id = $2 AND attendance_date = $3
             FOR UPDATE"
        );
        let records = sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(tenant_id)
            .bind(shift_window_id)
            .bind(date)
            .fetch_all(&mut *tx)
            .await?;

        let inputs: Vec<_> = records.iter().map(AttendanceRecord::rank_input).collect();
        let (ids, ranks): (Vec<DbId>, Vec<i32>) = compute_ranks(&inputs).into_iter().unzip();

        sqlx::query(
            "UPDATE attendance_records a SET rank = r.rank
             FROM UNNEST($1::BIGINT[], $2::INTEGER[]) AS r(id, rank)
             WHERE a.id = r.id",
        )
        .bind(&ids)
        .bind(&ranks)
        .execute(&mut *tx)
        .await?;

        let ranked_query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE tenant_id = $1 AND shift_window_id = $2 AND attendance_date = $3
             ORDER BY rank ASC"
        );
        let ranked = sqlx::query_as::<_, AttendanceRecord>(&ranked_query)
            .bind(tenant_id)
            .bind(shift_window_id)
            .bind(date)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ranked)
    }
}

async fn lock_shift_day(
    conn: &mut PgConnection,
    shift_window_id: DbId,
    date: NaiveDate,
) -> Result<(), sqlx::Error> {
    advisory_xact_lock(conn, day_scoped_lock_key(NS_ATTENDANCE, shift_window_id, date)).await
}

async fn prior_day_count(
    conn: &mut PgConnection,
    tenant_id: TenantId,
    staff_id: DbId,
    date: NaiveDate,
) -> Result<i32, sqlx::Error> {
    let Some(previous) = date.pred_opt() else {
        return Ok(0);
    };
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM attendance_records
         WHERE tenant_id = $1 AND staff_id = $2 AND attendance_date = $3",
    )
    .bind(tenant_id)
    .bind(staff_id)
    .bind(previous)
    .fetch_one(conn)
    .await?;
    Ok(row.0 as i32)
}
