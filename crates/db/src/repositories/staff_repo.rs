//! Repository for the `staff_members` table.
//!
//! Availability writes go through [`StaffRepo::transition`], which locks the
//! staff row, lets the caller's rule decide, and writes only on a change.
//! Repeating a transition is therefore always safe.

use sqlx::{PgConnection, PgPool};
use turnero_core::booking::LIFECYCLE_IN_PROGRESS;
use turnero_core::staff::{self, StaffAvailability, TransitionOutcome};
use turnero_core::types::{DbId, TenantId};

use crate::models::staff::{AppliedTransition, StaffMember};

const COLUMNS: &str = "id, tenant_id, full_name, availability, created_at, updated_at";

pub struct StaffRepo;

impl StaffRepo {
    pub async fn create(
        pool: &PgPool,
        tenant_id: TenantId,
        full_name: &str,
        availability: StaffAvailability,
    ) -> Result<StaffMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO staff_members (tenant_id, full_name, availability)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StaffMember>(&query)
            .bind(tenant_id)
            .bind(full_name)
            .bind(availability.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> Result<Option<StaffMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff_members WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, StaffMember>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Availability view, optionally filtered to one state, ordered by name.
    pub async fn list(
        pool: &PgPool,
        tenant_id: TenantId,
        availability: Option<StaffAvailability>,
    ) -> Result<Vec<StaffMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM staff_members
             WHERE tenant_id = $1 AND ($2::TEXT IS NULL OR availability = $2)
             ORDER BY full_name ASC, id ASC"
        );
        sqlx::query_as::<_, StaffMember>(&query)
            .bind(tenant_id)
            .bind(availability.map(|a| a.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Ids from `ids` that are not staff members of the tenant.
    pub async fn missing_ids(
        pool: &PgPool,
        tenant_id: TenantId,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT u.id FROM UNNEST($1::BIGINT[]) AS u(id)
             WHERE NOT EXISTS (
                SELECT 1 FROM staff_members s WHERE s.id = u.id AND s.tenant_id = $2)",
        )
        .bind(ids)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Apply a transition requested by booking code, judged against the
    /// committed bookings once the staff row is locked.
    ///
    /// - `occupied` only goes through while `booking_id` is in progress and
    ///   still lists the staff member; otherwise [`AppliedTransition::Superseded`].
    /// - `available` is skipped while any in-progress booking lists the
    ///   staff member, including `booking_id` if a later edit re-added them.
    pub async fn apply_booking_transition(
        pool: &PgPool,
        tenant_id: TenantId,
        staff_id: DbId,
        target: StaffAvailability,
        booking_id: DbId,
    ) -> Result<AppliedTransition, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(member) = lock_member(&mut *tx, tenant_id, staff_id).await? else {
            return Ok(AppliedTransition::Missing);
        };
        let current = parse_availability(&member)?;

        let held_elsewhere = match target {
            StaffAvailability::Available => {
                assigned_in_progress(&mut *tx, tenant_id, staff_id, None).await?
            }
            StaffAvailability::Occupied => {
                if !assigned_in_progress(&mut *tx, tenant_id, staff_id, Some(booking_id)).await? {
                    return Ok(AppliedTransition::Superseded);
                }
                false
            }
            _ => false,
        };

        let outcome = staff::booking_transition(current, target, held_elsewhere);
        if let TransitionOutcome::Changed { to, .. } = &outcome {
            write_availability(&mut *tx, staff_id, *to).await?;
        }

        tx.commit().await?;
        Ok(AppliedTransition::Evaluated(outcome))
    }

    /// Lock the row, let `decide` evaluate the current state, and write the
    /// new availability if it changed. Returns the row as stored afterwards.
    ///
    /// Returns `None` if the staff member does not belong to the tenant.
    pub async fn transition(
        pool: &PgPool,
        tenant_id: TenantId,
        staff_id: DbId,
        decide: impl FnOnce(StaffAvailability) -> TransitionOutcome,
    ) -> Result<Option<(StaffMember, TransitionOutcome)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(member) = lock_member(&mut *tx, tenant_id, staff_id).await? else {
            return Ok(None);
        };
        let outcome = decide(parse_availability(&member)?);

        let member = match &outcome {
            TransitionOutcome::Changed { to, .. } => {
                write_availability(&mut *tx, staff_id, *to).await?
            }
            _ => member,
        };

        tx.commit().await?;
        Ok(Some((member, outcome)))
    }
}

async fn lock_member(
    conn: &mut PgConnection,
    tenant_id: TenantId,
    staff_id: DbId,
) -> Result<Option<StaffMember>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNS} FROM staff_members WHERE id = $1 AND tenant_id = $2 FOR UPDATE"
    );
    sqlx::query_as::<_, StaffMember>(&query)
        .bind(staff_id)
        .bind(tenant_id)
        .fetch_optional(conn)
        .await
}

/// Whether an in-progress booking lists the staff member. `only` narrows
/// the check to one booking.
async fn assigned_in_progress(
    conn: &mut PgConnection,
    tenant_id: TenantId,
    staff_id: DbId,
    only: Option<DbId>,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(
            SELECT 1 FROM bookings
            WHERE tenant_id = $1 AND lifecycle = $3
              AND ($4::BIGINT IS NULL OR id = $4)
              AND $2 = ANY(staff_ids))",
    )
    .bind(tenant_id)
    .bind(staff_id)
    .bind(LIFECYCLE_IN_PROGRESS)
    .bind(only)
    .fetch_one(conn)
    .await?;
    Ok(row.0)
}

async fn write_availability(
    conn: &mut PgConnection,
    staff_id: DbId,
    to: StaffAvailability,
) -> Result<StaffMember, sqlx::Error> {
    let query =
        format!("UPDATE staff_members SET availability = $2 WHERE id = $1 RETURNING {COLUMNS}");
    sqlx::query_as::<_, StaffMember>(&query)
        .bind(staff_id)
        .bind(to.as_str())
        .fetch_one(conn)
        .await
}

/// The CHECK constraint keeps the column valid; anything else is a decode failure.
fn parse_availability(member: &StaffMember) -> Result<StaffAvailability, sqlx::Error> {
    member
        .availability()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
