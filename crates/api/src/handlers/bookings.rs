//! Handlers for the `/bookings` resource.
//!
//! Mutations answer with `{ data, recovered_failures }`: the booking as
//! written plus any staff availability changes that could not be applied.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use turnero_core::types::DbId;
use turnero_db::models::booking::{ArchiveBookings, BookingFilter, CreateBooking, UpdateBooking};

use crate::engine::BookingLifecycleManager;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::BookingListParams;
use crate::response::{BestEffortResponse, DataResponse};
use crate::state::AppState;

/// Upper bound on ids per archive request.
const MAX_ARCHIVE_BATCH: usize = 1000;

#[derive(Debug, Serialize)]
pub struct ArchiveResult {
    pub archived: u64,
}

/// GET /api/v1/bookings?date= | ?from=&to= [&include_archived=true]
pub async fn list_bookings(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BookingListParams>,
) -> AppResult<impl IntoResponse> {
    let (from, to) = params.range().resolve()?;
    let filter = BookingFilter {
        from,
        to,
        include_archived: params.include_archived,
    };
    let bookings = BookingLifecycleManager::list(&state.pool, auth.tenant_id, &filter).await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// POST /api/v1/bookings
pub async fn create_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBooking>,
) -> AppResult<impl IntoResponse> {
    let result =
        BookingLifecycleManager::create(&state.pool, auth.tenant_id, input, Some(auth.user_id))
            .await?;
    Ok((StatusCode::CREATED, Json(BestEffortResponse::from(result))))
}

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingLifecycleManager::get(&state.pool, auth.tenant_id, id).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// PATCH /api/v1/bookings/{id}
pub async fn update_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<UpdateBooking>,
) -> AppResult<impl IntoResponse> {
    let result = BookingLifecycleManager::update(&state.pool, auth.tenant_id, id, patch).await?;
    Ok(Json(BestEffortResponse::from(result)))
}

/// DELETE /api/v1/bookings/{id}
///
/// Returns the removed booking so callers can see which staff were released.
pub async fn delete_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let result = BookingLifecycleManager::delete(&state.pool, auth.tenant_id, id).await?;
    Ok(Json(BestEffortResponse::from(result)))
}

/// POST /api/v1/bookings/{id}/complete
pub async fn complete_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let result = BookingLifecycleManager::complete(&state.pool, auth.tenant_id, id).await?;
    Ok(Json(BestEffortResponse::from(result)))
}

/// POST /api/v1/bookings/archive
pub async fn archive_bookings(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ArchiveBookings>,
) -> AppResult<impl IntoResponse> {
    if input.booking_ids.len() > MAX_ARCHIVE_BATCH {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_ARCHIVE_BATCH} bookings can be archived per request"
        )));
    }
    let archived =
        BookingLifecycleManager::mark_archived(&state.pool, auth.tenant_id, &input.booking_ids)
            .await?;
    Ok(Json(DataResponse {
        data: ArchiveResult { archived },
    }))
}
