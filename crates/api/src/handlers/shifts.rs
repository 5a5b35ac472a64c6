//! Handlers for shift configurations, windows and clock-time resolution.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use turnero_core::shift_reconcile::ShiftSpec;
use turnero_core::time_window::{parse_time_of_day, serde_time_of_day, truncate_to_seconds};
use turnero_core::types::DbId;
use turnero_db::models::shift::{CreateShiftConfig, ShiftWindow, UpdateShiftWindow};

use crate::engine::ShiftRegistry;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::ResolveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `PUT /shifts/windows`.
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub shifts: Vec<ShiftSpec>,
}

#[derive(Debug, Serialize)]
pub struct ResolvedShift {
    /// The time that was resolved, `HH:MM:SS`.
    #[serde(with = "serde_time_of_day")]
    pub at: NaiveTime,
    /// `null` when no window contains `at`.
    pub shift: Option<ShiftWindow>,
}

// ---------------------------------------------------------------------------
// Configurations
// ---------------------------------------------------------------------------

/// GET /api/v1/shifts/configs
pub async fn list_configs(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let configs = ShiftRegistry::list_configs(&state.pool, auth.tenant_id).await?;
    Ok(Json(DataResponse { data: configs }))
}

/// POST /api/v1/shifts/configs
///
/// The new configuration starts inactive.
pub async fn create_config(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateShiftConfig>,
) -> AppResult<impl IntoResponse> {
    let config =
        ShiftRegistry::create_config(&state.pool, user.tenant_id, input, Some(user.user_id))
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: config })))
}

/// POST /api/v1/shifts/configs/{id}/activate
pub async fn activate_config(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(config_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let config = ShiftRegistry::activate_config(&state.pool, user.tenant_id, config_id).await?;
    Ok(Json(DataResponse { data: config }))
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// GET /api/v1/shifts/windows
///
/// Active windows of the active configuration, in display order.
pub async fn list_windows(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let windows = ShiftRegistry::list_windows(&state.pool, auth.tenant_id).await?;
    Ok(Json(DataResponse { data: windows }))
}

/// PUT /api/v1/shifts/windows
///
/// Upsert the desired shift list. Stored windows not in the list are kept.
pub async fn reconcile_windows(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<ReconcileRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome =
        ShiftRegistry::reconcile(&state.pool, user.tenant_id, input.shifts, Some(user.user_id))
            .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// PATCH /api/v1/shifts/windows/{id}
pub async fn update_window(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateShiftWindow>,
) -> AppResult<impl IntoResponse> {
    let window = ShiftRegistry::update_window(&state.pool, user.tenant_id, id, input).await?;
    tracing::info!(shift_window_id = id, user_id = user.user_id, "Shift window updated");
    Ok(Json(DataResponse { data: window }))
}

/// DELETE /api/v1/shifts/windows/{id}
pub async fn delete_window(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ShiftRegistry::delete_window(&state.pool, user.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// GET /api/v1/shifts/resolve?at=HH:MM[:SS]
///
/// The shift running at `at`, or right now on the server's wall clock.
pub async fn resolve(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> AppResult<impl IntoResponse> {
    let at = match params.at.as_deref() {
        Some(raw) => parse_time_of_day(raw)?,
        None => truncate_to_seconds(chrono::Local::now().time()),
    };
    let shift = ShiftRegistry::resolve(&state.pool, auth.tenant_id, at).await?;
    Ok(Json(DataResponse {
        data: ResolvedShift { at, shift },
    }))
}
