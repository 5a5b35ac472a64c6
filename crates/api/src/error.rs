//! HTTP error mapping.
//!
//! Engine services and handlers return [`AppResult`]. Every error leaves
//! the server as `{"error": <message>, "code": <CODE>}`; internal details
//! are logged, never sent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use turnero_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A request the handler refuses before any engine call.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl AppError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.status_code_message();
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::InvalidTimeRange(msg) => {
            (StatusCode::BAD_REQUEST, "INVALID_TIME_RANGE", msg.clone())
        }
        CoreError::AlreadyInState { .. } => {
            (StatusCode::CONFLICT, "ALREADY_IN_STATE", err.to_string())
        }
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal domain error");
            internal()
        }
    }
}

/// Map Postgres failures the schema makes expected onto client errors.
///
/// | SQLSTATE | Meaning                 | Response                   |
/// |----------|-------------------------|----------------------------|
/// | 23505    | unique on a `uq_*` name | 409 with a per-constraint message |
/// | 23503    | foreign key             | 400, a referenced row is missing |
/// | 23514    | check constraint        | 400 `VALIDATION_ERROR`     |
///
/// `RowNotFound` is 404; anything else is a logged 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            )
        }
        sqlx::Error::Database(db_err) => db_err,
        other => {
            tracing::error!(error = %other, "Database error");
            return internal();
        }
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some("23505") if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            unique_violation_message(constraint),
        ),
        Some("23503") => (
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            format!("Referenced record does not exist: {constraint}"),
        ),
        Some("23514") => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value rejected by constraint: {constraint}"),
        ),
        _ => {
            tracing::error!(error = %db_err, constraint, "Database error");
            internal()
        }
    }
}

fn unique_violation_message(constraint: &str) -> String {
    match constraint {
        "uq_attendance_staff_shift_date" => {
            "Attendance already recorded for this staff member, shift and date".to_string()
        }
        "uq_daily_registries_tenant_shift_date" => {
            "A live registry already exists for this shift and date".to_string()
        }
        "uq_bookings_tenant_date_sequence" => {
            "Booking sequence number already taken, retry the request".to_string()
        }
        "uq_shift_configs_active_tenant" => {
            "Another shift configuration was activated concurrently".to_string()
        }
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}
