//! Handlers for the staff registry and manual availability changes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use turnero_core::error::CoreError;
use turnero_core::staff::{manual_transition, StaffAvailability, TransitionOutcome};
use turnero_core::types::DbId;
use turnero_db::models::staff::{CreateStaffMember, SetAvailability};
use turnero_db::repositories::StaffRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::AvailabilityFilter;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_FULL_NAME_LEN: usize = 200;

/// GET /api/v1/staff[?availability=]
///
/// Availability view of the tenant's staff, ordered by name.
pub async fn list_staff(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AvailabilityFilter>,
) -> AppResult<impl IntoResponse> {
    let availability = params
        .availability
        .as_deref()
        .map(StaffAvailability::parse)
        .transpose()?;
    let staff = StaffRepo::list(&state.pool, auth.tenant_id, availability).await?;
    Ok(Json(DataResponse { data: staff }))
}

/// POST /api/v1/staff
pub async fn create_staff(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateStaffMember>,
) -> AppResult<impl IntoResponse> {
    let full_name = input.full_name.trim();
    if full_name.is_empty() || full_name.len() > MAX_FULL_NAME_LEN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "full_name must be 1 to {MAX_FULL_NAME_LEN} characters"
        ))));
    }
    let availability = input.availability.unwrap_or(StaffAvailability::Available);
    if availability == StaffAvailability::Occupied {
        return Err(AppError::Core(CoreError::Validation(
            "availability 'occupied' is only set by booking assignment".into(),
        )));
    }

    let member = StaffRepo::create(&state.pool, user.tenant_id, full_name, availability).await?;
    tracing::info!(
        tenant_id = user.tenant_id,
        staff_id = member.id,
        %availability,
        "Staff member registered",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// PUT /api/v1/staff/{id}/availability
///
/// Manual transition (rest, deactivation, return to work). Setting the
/// current value again is a no-op.
pub async fn set_availability(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(staff_id): Path<DbId>,
    Json(input): Json<SetAvailability>,
) -> AppResult<impl IntoResponse> {
    let target = input.availability;
    let (member, outcome) = StaffRepo::transition(&state.pool, auth.tenant_id, staff_id, |current| {
        manual_transition(current, target)
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "StaffMember",
        id: staff_id,
    }))?;

    match outcome {
        TransitionOutcome::Rejected(reason) => {
            return Err(AppError::Core(CoreError::Validation(reason)));
        }
        TransitionOutcome::Changed { from, to } => {
            tracing::info!(
                tenant_id = auth.tenant_id,
                staff_id,
                %from,
                %to,
                user_id = auth.user_id,
                "Staff availability set",
            );
        }
        TransitionOutcome::Unchanged => {}
    }

    Ok(Json(DataResponse { data: member }))
}
