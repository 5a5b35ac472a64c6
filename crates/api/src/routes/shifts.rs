//! Route definitions for the `/shifts` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::shifts;
use crate::state::AppState;

/// Routes mounted at `/shifts`.
///
/// ```text
/// GET    /configs                 -> list_configs
/// POST   /configs                 -> create_config
/// POST   /configs/{id}/activate   -> activate_config
/// GET    /windows                 -> list_windows
/// PUT    /windows                 -> reconcile_windows
/// PATCH  /windows/{id}            -> update_window
/// DELETE /windows/{id}            -> delete_window
/// GET    /resolve                 -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/configs",
            get(shifts::list_configs).post(shifts::create_config),
        )
        .route("/configs/{id}/activate", post(shifts::activate_config))
        .route(
            "/windows",
            get(shifts::list_windows).put(shifts::reconcile_windows),
        )
        .route(
            "/windows/{id}",
            patch(shifts::update_window).delete(shifts::delete_window),
        )
        .route("/resolve", get(shifts::resolve))
}
