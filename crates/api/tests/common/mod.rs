//! Shared helpers for HTTP-level integration tests.
//!
//! Requests go straight into the router via `tower::ServiceExt::oneshot`,
//! so every test runs the production middleware stack without a socket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use turnero_api::auth::jwt::{generate_access_token, JwtConfig};
use turnero_api::config::ServerConfig;
use turnero_api::router::build_app_router;
use turnero_api::state::AppState;
use turnero_core::roles::{ROLE_MANAGER, ROLE_STAFF};
use turnero_core::types::{DbId, TenantId};
use turnero_db::models::tenant::CreateTenant;
use turnero_db::repositories::TenantRepo;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 5,
        registry_retention_days: 30,
        registry_sweep_interval_secs: 3600,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router on top of the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A caller of one tenant with a bearer token.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: DbId,
    pub tenant_id: TenantId,
    pub token: String,
}

pub fn caller(user_id: DbId, tenant_id: TenantId, role: &str) -> Caller {
    let token = generate_access_token(user_id, tenant_id, role, &test_config().jwt).unwrap();
    Caller {
        user_id,
        tenant_id,
        token,
    }
}

pub async fn new_tenant(pool: &PgPool, name: &str) -> TenantId {
    TenantRepo::create(
        pool,
        &CreateTenant {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// A fresh tenant with a manager and a staff-role caller.
pub async fn tenant_with_callers(pool: &PgPool) -> (Caller, Caller) {
    let tenant = new_tenant(pool, "Club Norte").await;
    (caller(1, tenant, ROLE_MANAGER), caller(2, tenant, ROLE_STAFF))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    caller: Option<&Caller>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = caller {
        builder = builder.header("authorization", format!("Bearer {}", c.token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: Router, caller: &Caller, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(caller), None).await
}

pub async fn post_json(app: Router, caller: &Caller, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(caller), Some(body)).await
}

pub async fn post_empty(app: Router, caller: &Caller, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(caller), None).await
}

pub async fn put_json(app: Router, caller: &Caller, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(caller), Some(body)).await
}

pub async fn patch_json(app: Router, caller: &Caller, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(caller), Some(body)).await
}

pub async fn delete(app: Router, caller: &Caller, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(caller), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
