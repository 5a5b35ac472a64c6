//! Handlers for attendance records, ranking and statistics.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use turnero_core::types::DbId;
use turnero_db::models::attendance::{CreateAttendance, UpdateAttendance};

use crate::engine::AttendanceRanker;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{DateRangeParams, ShiftDayParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/attendance?date=&shift_window_id=
///
/// Records of one shift-day, ranked ones first in rank order.
pub async fn list_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ShiftDayParams>,
) -> AppResult<impl IntoResponse> {
    let records = AttendanceRanker::list_for_shift_day(
        &state.pool,
        auth.tenant_id,
        params.date,
        params.shift_window_id,
    )
    .await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/attendance
pub async fn record_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAttendance>,
) -> AppResult<impl IntoResponse> {
    let record = AttendanceRanker::record(&state.pool, auth.tenant_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// PATCH /api/v1/attendance/{id}
pub async fn update_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAttendance>,
) -> AppResult<impl IntoResponse> {
    let record =
        AttendanceRanker::set_tasks_completed(&state.pool, auth.tenant_id, id, input.tasks_completed)
            .await?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/attendance/rank
///
/// Body: `{ "date": "YYYY-MM-DD", "shift_window_id": N }`.
pub async fn rank_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ShiftDayParams>,
) -> AppResult<impl IntoResponse> {
    let ranked =
        AttendanceRanker::rank(&state.pool, auth.tenant_id, input.date, input.shift_window_id)
            .await?;
    Ok(Json(DataResponse { data: ranked }))
}

/// GET /api/v1/attendance/summary?from=&to=
pub async fn attendance_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let (from, to) = params.resolve()?;
    let summary = AttendanceRanker::summary(&state.pool, auth.tenant_id, from, to).await?;
    Ok(Json(DataResponse { data: summary }))
}
