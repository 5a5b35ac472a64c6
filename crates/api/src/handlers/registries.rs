//! Handlers for daily shift registries and their trash.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use turnero_core::types::DbId;
use turnero_db::models::registry::CloseShift;

use crate::engine::RegistryRetentionStore;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/registries
///
/// Close a shift: snapshot its active bookings and archive them.
pub async fn close_shift(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CloseShift>,
) -> AppResult<impl IntoResponse> {
    let registry =
        RegistryRetentionStore::close_shift(&state.pool, user.tenant_id, input, user.user_id)
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: registry })))
}

/// GET /api/v1/registries
pub async fn list_registries(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let registries = RegistryRetentionStore::list(&state.pool, auth.tenant_id).await?;
    Ok(Json(DataResponse { data: registries }))
}

/// GET /api/v1/registries/trash
pub async fn list_trash(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let trashed = RegistryRetentionStore::list_trashed(&state.pool, auth.tenant_id).await?;
    Ok(Json(DataResponse { data: trashed }))
}

/// GET /api/v1/registries/{id}
pub async fn get_registry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let registry = RegistryRetentionStore::get(&state.pool, auth.tenant_id, id).await?;
    Ok(Json(DataResponse { data: registry }))
}

/// DELETE /api/v1/registries/{id}
///
/// Move to the trash. The entry stays restorable until purged or swept.
pub async fn soft_delete_registry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let registry =
        RegistryRetentionStore::soft_delete(&state.pool, auth.tenant_id, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: registry }))
}

/// POST /api/v1/registries/{id}/restore
pub async fn restore_registry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let registry = RegistryRetentionStore::restore(&state.pool, auth.tenant_id, id).await?;
    Ok(Json(DataResponse { data: registry }))
}

/// DELETE /api/v1/registries/{id}/purge
pub async fn purge_registry(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    RegistryRetentionStore::purge(&state.pool, user.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/registries/sweep
///
/// Purge this tenant's trashed registries older than the configured
/// retention period.
pub async fn sweep_registries(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = RegistryRetentionStore::sweep_expired(
        &state.pool,
        Some(user.tenant_id),
        state.config.registry_retention_days,
        Utc::now(),
    )
    .await?;
    Ok(Json(DataResponse { data: report }))
}
