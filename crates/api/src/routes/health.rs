//! Liveness and readiness probe, mounted outside `/api/v1`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthReport {
    /// `ok` when Postgres answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    /// Days a trashed registry is kept before the sweep purges it.
    pub registry_retention_days: i64,
}

/// GET /health
///
/// Answers 503 while the database is unreachable so load balancers stop
/// routing booking traffic here.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let reachable = match turnero_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health probe could not reach the database");
            false
        }
    };

    let (code, status, database) = if reachable {
        (StatusCode::OK, "ok", "up")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
    };

    let report = HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database,
        registry_retention_days: state.config.registry_retention_days,
    };
    (code, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
