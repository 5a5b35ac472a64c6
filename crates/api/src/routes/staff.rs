//! Route definitions for the `/staff` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::staff;
use crate::state::AppState;

/// Routes mounted at `/staff`.
///
/// ```text
/// GET    /                     -> list_staff
/// POST   /                     -> create_staff
/// PUT    /{id}/availability    -> set_availability
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(staff::list_staff).post(staff::create_staff))
        .route("/{id}/availability", put(staff::set_availability))
}
