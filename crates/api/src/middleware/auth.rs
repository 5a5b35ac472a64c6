//! Caller identity from a bearer token.
//!
//! Authentication happens upstream; this service only verifies the token
//! signature and reads who is calling and on behalf of which tenant.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use turnero_core::error::CoreError;
use turnero_core::roles::{ROLE_ADMIN, ROLE_MANAGER};
use turnero_core::types::{DbId, TenantId};

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller of a request. Every handler hands `tenant_id` to the engine
/// explicitly.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub tenant_id: TenantId,
    pub role: String,
}

impl AuthUser {
    /// Managers and admins may change shift configuration and purge
    /// registries.
    pub fn can_manage(&self) -> bool {
        self.role == ROLE_MANAGER || self.role == ROLE_ADMIN
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            CoreError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
            role: claims.role,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| CoreError::Unauthorized("Authorization header is not valid text".into()))?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(CoreError::Unauthorized(
            "Expected 'Authorization: Bearer <token>'".into(),
        )),
    }
}
