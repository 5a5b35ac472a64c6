//! HS256 bearer tokens carrying the caller, tenant and role.
//!
//! The identity service signs tokens with the shared secret. This server
//! validates them; [`generate_access_token`] exists for tooling and tests.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use turnero_core::roles;
use turnero_core::types::{DbId, TenantId};
use uuid::Uuid;

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Caller id in the identity service.
    pub sub: DbId,
    pub tenant_id: TenantId,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token names no tenant")]
    MissingTenant,

    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// `JWT_SECRET` (required, non-empty) and `JWT_ACCESS_EXPIRY_MINS`
    /// (default 15).
    ///
    /// # Panics
    ///
    /// On a missing or empty secret, or an unparseable expiry.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .map(|raw| {
                raw.parse()
                    .expect("JWT_ACCESS_EXPIRY_MINS must be a whole number of minutes")
            })
            .unwrap_or(DEFAULT_ACCESS_EXPIRY_MINS);

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

/// Sign a token for `user_id` acting in `tenant_id`.
pub fn generate_access_token(
    user_id: DbId,
    tenant_id: TenantId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        tenant_id,
        role: role.to_string(),
        exp: issued_at + config.access_token_expiry_mins * 60,
        iat: issued_at,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry, then check the claims name a tenant and a
/// role this service knows.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )?
    .claims;

    if claims.tenant_id <= 0 {
        return Err(TokenError::MissingTenant);
    }
    if !roles::is_known(&claims.role) {
        return Err(TokenError::UnknownRole(claims.role));
    }
    Ok(claims)
}
