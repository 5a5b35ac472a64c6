//! Route definitions for the `/attendance` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// GET    /          -> list_attendance
/// POST   /          -> record_attendance
/// POST   /rank      -> rank_attendance
/// GET    /summary   -> attendance_summary
/// PATCH  /{id}      -> update_attendance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(attendance::list_attendance).post(attendance::record_attendance),
        )
        .route("/rank", post(attendance::rank_attendance))
        .route("/summary", get(attendance::attendance_summary))
        .route("/{id}", patch(attendance::update_attendance))
}
