//! Repository for the `bookings` table.
//!
//! Sequence numbers are reserved under a per-(tenant, date) advisory lock in
//! the same transaction as the write; `uq_bookings_tenant_date_sequence` is
//! the backstop if anything bypasses the lock.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use turnero_core::booking::{
    next_sequence, LIFECYCLE_COMPLETED, LIFECYCLE_IN_PROGRESS, REGISTRATION_ACTIVE,
    REGISTRATION_ARCHIVED,
};
use turnero_core::locking::{day_scoped_lock_key, NS_BOOKING_SEQUENCE};
use turnero_core::types::{DbId, TenantId};

use super::advisory_xact_lock;
use crate::models::booking::{Booking, BookingChanges, BookingFilter, BookingWrite, CreateBooking};

const COLUMNS: &str = "id, tenant_id, booking_date, start_time, end_time, court_id, staff_ids, \
                       shift_window_id, lifecycle, registration, sequence_number, notes, \
                       created_by, completed_at, created_at, updated_at";

pub struct BookingRepo;

impl BookingRepo {
    /// Insert a booking with the next sequence number for its day.
    ///
    /// `staff_ids` and `shift_window_id` are the resolved values; the raw
    /// fields on `input` are ignored.
    pub async fn create(
        pool: &PgPool,
        tenant_id: TenantId,
        input: &CreateBooking,
        staff_ids: &[DbId],
        shift_window_id: Option<DbId>,
        created_by: Option<DbId>,
    ) -> Result<Booking, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let sequence = reserve_sequence(&mut *tx, tenant_id, input.booking_date).await?;

        let query = format!(
            "INSERT INTO bookings
                (tenant_id, booking_date, start_time, end_time, court_id, staff_ids,
                 shift_window_id, lifecycle, registration, sequence_number, notes, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(tenant_id)
            .bind(input.booking_date)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.court_id)
            .bind(staff_ids)
            .bind(shift_window_id)
            .bind(LIFECYCLE_IN_PROGRESS)
            .bind(REGISTRATION_ACTIVE)
            .bind(sequence)
            .bind(&input.notes)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(booking)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Bookings in an inclusive date range ordered `(date, sequence)`.
    /// Archived bookings are excluded unless requested.
    pub async fn list(
        pool: &PgPool,
        tenant_id: TenantId,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings
             WHERE tenant_id = $1
               AND booking_date BETWEEN $2 AND $3
               AND ($4 OR registration = $5)
             ORDER BY booking_date ASC, sequence_number ASC"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(tenant_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.include_archived)
            .bind(REGISTRATION_ACTIVE)
            .fetch_all(pool)
            .await
    }

    /// Write resolved changes to an in-progress booking.
    ///
    /// `changes` were derived from `read`. The row is locked first and the
    /// write only happens while its staff set, date and lifecycle still
    /// match `read`, so the caller's staff diff describes exactly what this
    /// write replaced. Moving the booking to another date reserves a fresh
    /// sequence number on the new date.
    pub async fn update(
        pool: &PgPool,
        tenant_id: TenantId,
        read: &Booking,
        changes: &BookingChanges,
    ) -> Result<BookingWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock = format!(
            "SELECT {COLUMNS} FROM bookings WHERE id = $1 AND tenant_id = $2 FOR UPDATE"
        );
        let Some(stored) = sqlx::query_as::<_, Booking>(&lock)
            .bind(read.id)
            .bind(tenant_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(BookingWrite::Missing);
        };
        if stored.lifecycle != LIFECYCLE_IN_PROGRESS
            || stored.lifecycle != read.lifecycle
            || stored.staff_ids != read.staff_ids
            || stored.booking_date != read.booking_date
        {
            return Ok(BookingWrite::Stale(stored));
        }

        let sequence = if changes.booking_date != stored.booking_date {
            Some(reserve_sequence(&mut *tx, tenant_id, changes.booking_date).await?)
        } else {
            None
        };

        let query = format!(
            "UPDATE bookings SET
                booking_date = $3,
                start_time = $4,
                end_time = $5,
                court_id = $6,
                staff_ids = $7,
                shift_window_id = $8,
                notes = $9,
                sequence_number = COALESCE($10, sequence_number)
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(stored.id)
            .bind(tenant_id)
            .bind(changes.booking_date)
            .bind(changes.start_time)
            .bind(changes.end_time)
            .bind(changes.court_id)
            .bind(&changes.staff_ids)
            .bind(changes.shift_window_id)
            .bind(&changes.notes)
            .bind(sequence)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(BookingWrite::Written(booking))
    }

    /// Delete a booking, returning the removed row.
    pub async fn delete(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query =
            format!("DELETE FROM bookings WHERE id = $1 AND tenant_id = $2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Move an in-progress booking to `completed`.
    ///
    /// Returns `None` when no in-progress booking matched (missing or
    /// already completed).
    pub async fn complete(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET lifecycle = $3, completed_at = NOW()
             WHERE id = $1 AND tenant_id = $2 AND lifecycle = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(LIFECYCLE_COMPLETED)
            .bind(LIFECYCLE_IN_PROGRESS)
            .fetch_optional(pool)
            .await
    }

    /// Bulk-archive bookings. Returns the number of rows that changed.
    pub async fn mark_archived(
        pool: &PgPool,
        tenant_id: TenantId,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bookings SET registration = $3
             WHERE tenant_id = $1 AND id = ANY($2) AND registration <> $3",
        )
        .bind(tenant_id)
        .bind(ids)
        .bind(REGISTRATION_ARCHIVED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Lock the (tenant, date) sequence and return the next free number.
async fn reserve_sequence(
    conn: &mut PgConnection,
    tenant_id: TenantId,
    date: NaiveDate,
) -> Result<i32, sqlx::Error> {
    advisory_xact_lock(
        &mut *conn,
        day_scoped_lock_key(NS_BOOKING_SEQUENCE, tenant_id, date),
    )
    .await?;

    let current: (Option<i32>,) = sqlx::query_as(
        "SELECT MAX(sequence_number) FROM bookings WHERE tenant_id = $1 AND booking_date = $2",
    )
    .bind(tenant_id)
    .bind(date)
    .fetch_one(&mut *conn)
    .await?;
    Ok(next_sequence(current.0))
}
