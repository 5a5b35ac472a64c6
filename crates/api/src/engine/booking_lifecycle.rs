//! Booking lifecycle: `in_progress -> completed`, registration
//! `active -> archived`, and the staff availability side effects.
//!
//! The booking write is always the primary outcome. Staff transitions run
//! after it commits; a failed transition is logged and returned in
//! [`BestEffort::recovered_failures`] but never undoes the booking.

use futures::future::join_all;
use sqlx::PgPool;
use turnero_core::booking::{
    diff_staff, normalize_staff_ids, BestEffort, BookingLifecycle, ShiftAssignment,
    StaffTransitionFailure,
};
use turnero_core::error::CoreError;
use turnero_core::staff::{StaffAvailability, TransitionOutcome};
use turnero_core::time_window::validate_booking_range;
use turnero_core::types::{DbId, TenantId};
use turnero_db::models::booking::{
    Booking, BookingChanges, BookingFilter, BookingWrite, CreateBooking, UpdateBooking,
};
use turnero_db::models::staff::AppliedTransition;
use turnero_db::repositories::{BookingRepo, StaffRepo};

use super::ensure_tenant;
use super::shift_registry::{find_window, ShiftRegistry};
use crate::error::AppResult;

/// Times an update is rebuilt on a newer row before answering `Conflict`.
pub const MAX_UPDATE_ATTEMPTS: u32 = 5;

pub struct BookingLifecycleManager;

impl BookingLifecycleManager {
    /// Create a booking with the next sequence number of its day.
    ///
    /// An explicit shift is stored verbatim; otherwise the shift is inferred
    /// from the start time. Assigned staff become `occupied`.
    pub async fn create(
        pool: &PgPool,
        tenant_id: TenantId,
        input: CreateBooking,
        actor: Option<DbId>,
    ) -> AppResult<BestEffort<Booking>> {
        validate_booking_range(input.start_time, input.end_time)?;
        let staff_ids = normalize_staff_ids(&input.staff_ids)?;
        ensure_tenant(pool, tenant_id).await?;
        ensure_staff_exist(pool, tenant_id, &staff_ids).await?;

        let inferred = match input.shift_window_id {
            Some(explicit) => {
                find_window(pool, tenant_id, explicit).await?;
                None
            }
            None => ShiftRegistry::resolve_at(pool, tenant_id, input.start_time)
                .await?
                .map(|w| w.id),
        };
        let assignment = ShiftAssignment::choose(input.shift_window_id, || inferred);

        let booking = BookingRepo::create(
            pool,
            tenant_id,
            &input,
            &staff_ids,
            assignment.shift_window_id(),
            actor,
        )
        .await?;

        tracing::info!(
            tenant_id,
            booking_id = booking.id,
            booking_date = %booking.booking_date,
            sequence_number = booking.sequence_number,
            shift = ?assignment,
            staff = booking.staff_ids.len(),
            "Booking created",
        );

        let failures = transition_all(
            pool,
            tenant_id,
            booking.id,
            &booking.staff_ids,
            StaffAvailability::Occupied,
        )
        .await;
        Ok(BestEffort::new(booking, failures))
    }

    /// Patch an in-progress booking.
    ///
    /// Staff removed from the assignment are released, staff added are
    /// occupied and staff kept are untouched. The shift only changes when the
    /// patch names one; moving the start time does not re-infer it.
    ///
    /// The patch is applied over the row as stored when the write lands. If
    /// a concurrent edit moved the staff set or the date in between, the
    /// patch is rebuilt on the newer row, up to [`MAX_UPDATE_ATTEMPTS`] times.
    pub async fn update(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
        patch: UpdateBooking,
    ) -> AppResult<BestEffort<Booking>> {
        let requested_staff = patch
            .staff_ids
            .as_deref()
            .map(normalize_staff_ids)
            .transpose()?;
        let explicit_shift = match patch.shift_window_id {
            Some(explicit) => Some(find_window(pool, tenant_id, explicit).await?.id),
            None => None,
        };

        let mut current = Self::get(pool, tenant_id, id).await?;
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            current.lifecycle()?.ensure_editable(id)?;

            let start_time = patch.start_time.unwrap_or(current.start_time);
            let end_time = patch.end_time.unwrap_or(current.end_time);
            validate_booking_range(start_time, end_time)?;

            let staff_ids = requested_staff
                .clone()
                .unwrap_or_else(|| current.staff_ids.clone());
            let diff = diff_staff(&current.staff_ids, &staff_ids);
            ensure_staff_exist(pool, tenant_id, &diff.added).await?;

            let changes = BookingChanges {
                booking_date: patch.booking_date.unwrap_or(current.booking_date),
                start_time,
                end_time,
                court_id: patch.court_id.or(current.court_id),
                staff_ids,
                shift_window_id: explicit_shift.or(current.shift_window_id),
                notes: patch.notes.clone().or_else(|| current.notes.clone()),
            };

            let booking = match BookingRepo::update(pool, tenant_id, &current, &changes).await? {
                BookingWrite::Written(booking) => booking,
                BookingWrite::Missing => return Err(booking_not_found(id)),
                BookingWrite::Stale(latest) => {
                    tracing::debug!(
                        tenant_id,
                        booking_id = id,
                        attempt,
                        "Booking moved under update, retrying",
                    );
                    current = latest;
                    continue;
                }
            };

            tracing::info!(
                tenant_id,
                booking_id = id,
                released = ?diff.released,
                added = ?diff.added,
                "Booking updated",
            );

            let mut failures =
                transition_all(pool, tenant_id, id, &diff.released, StaffAvailability::Available)
                    .await;
            failures.extend(
                transition_all(pool, tenant_id, id, &diff.added, StaffAvailability::Occupied).await,
            );
            return Ok(BestEffort::new(booking, failures));
        }

        current.lifecycle()?.ensure_editable(id)?;
        Err(CoreError::Conflict(format!(
            "Booking {id} changed concurrently, retry the request"
        ))
        .into())
    }

    /// Remove a booking. Staff of an in-progress booking are released once
    /// the row is gone.
    pub async fn delete(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> AppResult<BestEffort<Booking>> {
        let booking = BookingRepo::delete(pool, tenant_id, id)
            .await?
            .ok_or_else(|| booking_not_found(id))?;

        tracing::info!(tenant_id, booking_id = id, "Booking deleted");

        let failures = if booking.lifecycle()? == BookingLifecycle::InProgress {
            transition_all(pool, tenant_id, id, &booking.staff_ids, StaffAvailability::Available)
                .await
        } else {
            Vec::new()
        };
        Ok(BestEffort::new(booking, failures))
    }

    /// `in_progress -> completed`, then release the assigned staff.
    ///
    /// Completing twice is [`CoreError::AlreadyInState`].
    pub async fn complete(
        pool: &PgPool,
        tenant_id: TenantId,
        id: DbId,
    ) -> AppResult<BestEffort<Booking>> {
        let current = Self::get(pool, tenant_id, id).await?;
        current.lifecycle()?.complete(id)?;

        let Some(booking) = BookingRepo::complete(pool, tenant_id, id).await? else {
            // Someone else completed or deleted it first.
            let latest = Self::get(pool, tenant_id, id).await?;
            latest.lifecycle()?.complete(id)?;
            return Err(CoreError::Conflict(format!("Booking {id} changed concurrently")).into());
        };

        tracing::info!(tenant_id, booking_id = id, "Booking completed");

        let failures = transition_all(
            pool,
            tenant_id,
            id,
            &booking.staff_ids,
            StaffAvailability::Available,
        )
        .await;
        Ok(BestEffort::new(booking, failures))
    }

    /// Bulk `active -> archived`. Returns how many bookings changed;
    /// already-archived and unknown ids are skipped.
    pub async fn mark_archived(pool: &PgPool, tenant_id: TenantId, ids: &[DbId]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let archived = BookingRepo::mark_archived(pool, tenant_id, ids).await?;
        tracing::info!(tenant_id, requested = ids.len(), archived, "Bookings archived");
        Ok(archived)
    }

    pub async fn get(pool: &PgPool, tenant_id: TenantId, id: DbId) -> AppResult<Booking> {
        BookingRepo::find_by_id(pool, tenant_id, id)
            .await?
            .ok_or_else(|| booking_not_found(id))
    }

    pub async fn list(
        pool: &PgPool,
        tenant_id: TenantId,
        filter: &BookingFilter,
    ) -> AppResult<Vec<Booking>> {
        Ok(BookingRepo::list(pool, tenant_id, filter).await?)
    }
}

fn booking_not_found(id: DbId) -> crate::error::AppError {
    CoreError::NotFound {
        entity: "Booking",
        id,
    }
    .into()
}

async fn ensure_staff_exist(pool: &PgPool, tenant_id: TenantId, ids: &[DbId]) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let missing = StaffRepo::missing_ids(pool, tenant_id, ids).await?;
    match missing.first() {
        None => Ok(()),
        Some(&id) => Err(CoreError::NotFound {
            entity: "StaffMember",
            id,
        }
        .into()),
    }
}

/// Apply one booking-driven transition to each staff member and collect
/// the ones that did not go through.
async fn transition_all(
    pool: &PgPool,
    tenant_id: TenantId,
    booking_id: DbId,
    staff_ids: &[DbId],
    target: StaffAvailability,
) -> Vec<StaffTransitionFailure> {
    let results = join_all(staff_ids.iter().map(|&staff_id| async move {
        let applied =
            StaffRepo::apply_booking_transition(pool, tenant_id, staff_id, target, booking_id)
                .await;
        (staff_id, applied)
    }))
    .await;

    let mut failures = Vec::new();
    for (staff_id, applied) in results {
        let reason = match applied {
            Ok(AppliedTransition::Evaluated(TransitionOutcome::Changed { from, to })) => {
                tracing::debug!(tenant_id, booking_id, staff_id, %from, %to, "Staff availability changed");
                continue;
            }
            Ok(AppliedTransition::Evaluated(TransitionOutcome::Unchanged)) => continue,
            Ok(AppliedTransition::Superseded) => {
                tracing::debug!(
                    tenant_id,
                    booking_id,
                    staff_id,
                    "Staff no longer assigned, transition skipped",
                );
                continue;
            }
            Ok(AppliedTransition::Evaluated(TransitionOutcome::Rejected(reason))) => reason,
            Ok(AppliedTransition::Missing) => "staff member not found".to_string(),
            Err(e) => e.to_string(),
        };
        tracing::warn!(
            tenant_id,
            booking_id,
            staff_id,
            target = %target,
            reason = %reason,
            "Staff transition failed; booking kept",
        );
        failures.push(StaffTransitionFailure {
            staff_id,
            target,
            reason,
        });
    }
    failures
}
