//! Route definitions for the `/registries` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::registries;
use crate::state::AppState;

/// Routes mounted at `/registries`.
///
/// ```text
/// GET    /               -> list_registries
/// POST   /               -> close_shift
/// GET    /trash          -> list_trash
/// POST   /sweep          -> sweep_registries
/// GET    /{id}           -> get_registry
/// DELETE /{id}           -> soft_delete_registry
/// POST   /{id}/restore   -> restore_registry
/// DELETE /{id}/purge     -> purge_registry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(registries::list_registries).post(registries::close_shift),
        )
        .route("/trash", get(registries::list_trash))
        .route("/sweep", post(registries::sweep_registries))
        .route(
            "/{id}",
            get(registries::get_registry).delete(registries::soft_delete_registry),
        )
        .route("/{id}/restore", post(registries::restore_registry))
        .route("/{id}/purge", delete(registries::purge_registry))
}
