//! Role gate for configuration and destructive registry operations.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use turnero_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An [`AuthUser`] holding the `manager` or `admin` role; anyone else gets
/// 403.
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.can_manage() {
            tracing::debug!(
                user_id = user.user_id,
                tenant_id = user.tenant_id,
                role = %user.role,
                "Manager role required",
            );
            return Err(CoreError::Forbidden(format!(
                "Role '{}' cannot change shift configuration or registries",
                user.role
            ))
            .into());
        }
        Ok(RequireManager(user))
    }
}
