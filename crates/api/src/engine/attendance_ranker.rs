//! Attendance recording and per-(shift, date) ranking.

use chrono::NaiveDate;
use sqlx::PgPool;
use turnero_core::attendance::{summarize, AttendanceSummary};
use turnero_core::error::CoreError;
use turnero_core::types::{DbId, TenantId};
use turnero_db::models::attendance::{AttendanceRecord, CreateAttendance};
use turnero_db::repositories::{AttendanceRepo, StaffRepo};

use super::shift_registry::find_window;
use crate::error::AppResult;

pub struct AttendanceRanker;

impl AttendanceRanker {
    /// Record a staff member's arrival for a shift. A second record for the
    /// same (staff, shift, date) is a conflict.
    pub async fn record(
        pool: &PgPool,
        tenant_id: TenantId,
        input: CreateAttendance,
    ) -> AppResult<AttendanceRecord> {
        if matches!(input.prior_day_shift_count, Some(n) if n < 0) {
            return Err(
                CoreError::Validation("prior_day_shift_count must not be negative".into()).into(),
            );
        }
        if StaffRepo::find_by_id(pool, tenant_id, input.staff_id)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFound {
                entity: "StaffMember",
                id: input.staff_id,
            }
            .into());
        }
        find_window(pool, tenant_id, input.shift_window_id).await?;

        let record = AttendanceRepo::create(pool, tenant_id, &input).await?;
        tracing::info!(
            tenant_id,
            attendance_id = record.id,
            staff_id = record.staff_id,
            shift_window_id = record.shift_window_id,
            prior_day_shift_count = record.prior_day_shift_count,
            "Attendance recorded",
        );
        Ok(record)
    }

    pub async fn set_tasks_completed(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
        tasks_completed: bool,
    ) -> AppResult<AttendanceRecord> {
        AttendanceRepo::set_tasks_completed(pool, tenant_id, id, tasks_completed)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "AttendanceRecord",
                    id,
                }
                .into()
            })
    }

    /// Rank every record of (shift, date) and persist ranks `1..=N`.
    /// Re-running overwrites earlier ranks.
    pub async fn rank(
        pool: &PgPool,
        tenant_id: TenantId,
        date: NaiveDate,
        shift_window_id: DbId,
    ) -> AppResult<Vec<AttendanceRecord>> {
        find_window(pool, tenant_id, shift_window_id).await?;
        let ranked = AttendanceRepo::rank(pool, tenant_id, shift_window_id, date).await?;
        tracing::info!(
            tenant_id,
            shift_window_id,
            %date,
            ranked = ranked.len(),
            "Attendance ranked",
        );
        Ok(ranked)
    }

    pub async fn list_for_shift_day(
        pool: &PgPool,
        tenant_id: TenantId,
        date: NaiveDate,
        shift_window_id: DbId,
    ) -> AppResult<Vec<AttendanceRecord>> {
        Ok(AttendanceRepo::list_for_shift_day(pool, tenant_id, shift_window_id, date).await?)
    }

    pub async fn summary(
        pool: &PgPool,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<AttendanceSummary> {
        let records = AttendanceRepo::list_range(pool, tenant_id, from, to).await?;
        let inputs: Vec<_> = records.iter().map(AttendanceRecord::summary_input).collect();
        Ok(summarize(&inputs))
    }
}
