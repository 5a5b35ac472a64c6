//! Route definitions for the `/bookings` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
///
/// ```text
/// GET    /                -> list_bookings
/// POST   /                -> create_booking
/// POST   /archive         -> archive_bookings
/// GET    /{id}            -> get_booking
/// PATCH  /{id}            -> update_booking
/// DELETE /{id}            -> delete_booking
/// POST   /{id}/complete   -> complete_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/archive", post(bookings::archive_bookings))
        .route(
            "/{id}",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/{id}/complete", post(bookings::complete_booking))
}
