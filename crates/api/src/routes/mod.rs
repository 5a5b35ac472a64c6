pub mod attendance;
pub mod bookings;
pub mod health;
pub mod registries;
pub mod shifts;
pub mod staff;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /shifts/configs                        list
/// /shifts/configs/{id}/activate          activate (POST, manager)
/// /shifts/windows                        list, reconcile (PUT, manager)
/// /shifts/windows/{id}                   patch, delete (manager)
/// /shifts/resolve                        resolve ?at=HH:MM[:SS]
///
/// /bookings                              list, create
/// /bookings/archive                      bulk archive (POST)
/// /bookings/{id}                         get, patch, delete
/// /bookings/{id}/complete                complete (POST)
///
/// /staff                                 list, register (manager)
/// /staff/{id}/availability               manual transition (PUT)
///
/// /attendance                            ranked listing, record arrival
/// /attendance/{id}                       tasks-completed flag (PATCH)
/// /attendance/rank                       rank a shift-day (POST)
/// /attendance/summary                    statistics over a date range
///
/// /registries                            list, close shift (POST, manager)
/// /registries/trash                      trash view
/// /registries/sweep                      tenant retention sweep (POST, manager)
/// /registries/{id}                       get, soft delete
/// /registries/{id}/restore               restore (POST)
/// /registries/{id}/purge                 hard delete (DELETE, manager)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/shifts", shifts::router())
        .nest("/bookings", bookings::router())
        .nest("/staff", staff::router())
        .nest("/attendance", attendance::router())
        .nest("/registries", registries::router())
}
