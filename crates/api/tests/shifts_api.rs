//! HTTP tests for shift reconciliation, direct edits and resolution.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete, get_as, patch_json, post_empty, post_json, put_json, tenant_with_callers,
    Caller,
};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn three_shifts() -> Value {
    json!({ "shifts": [
        { "code": "M", "name": "Morning", "start_time": "06:00", "end_time": "14:00", "sort_order": 1 },
        { "code": "T", "name": "Afternoon", "start_time": "14:00", "end_time": "22:00", "sort_order": 2 },
        { "code": "N", "name": "Night", "start_time": "22:00", "end_time": "06:00", "sort_order": 3 },
    ]})
}

async fn reconcile(pool: &PgPool, manager: &Caller, body: Value) -> Value {
    let app = common::build_test_app(pool.clone());
    let response = put_json(app, manager, "/api/v1/shifts/windows", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn resolved_code(pool: &PgPool, caller: &Caller, at: &str) -> Value {
    let app = common::build_test_app(pool.clone());
    let response = get_as(app, caller, &format!("/api/v1/shifts/resolve?at={at}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["shift"]["code"].clone()
}

async fn window_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM shift_windows")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reconcile_creates_windows_in_submission_order(pool: PgPool) {
    let (manager, _) = tenant_with_callers(&pool).await;

    let json = reconcile(&pool, &manager, three_shifts()).await;

    let windows = json["data"]["windows"].as_array().unwrap();
    let codes: Vec<&str> = windows.iter().map(|w| w["code"].as_str().unwrap()).collect();
    assert_eq!(codes, ["M", "T", "N"]);
    assert_eq!(windows[0]["start_time"], "06:00:00");
    assert_eq!(windows[2]["end_time"], "06:00:00");
    assert_eq!(json["data"]["created"], 3);
    assert_eq!(json["data"]["updated"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reconciling_twice_does_not_grow_storage(pool: PgPool) {
    let (manager, _) = tenant_with_callers(&pool).await;

    reconcile(&pool, &manager, three_shifts()).await;
    let second = reconcile(&pool, &manager, three_shifts()).await;

    assert_eq!(second["data"]["created"], 0);
    assert_eq!(second["data"]["updated"], 3);
    assert_eq!(window_count(&pool).await, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_entry_leaves_no_partial_rows(pool: PgPool) {
    let (manager, _) = tenant_with_callers(&pool).await;
    let body = json!({ "shifts": [
        { "code": "M", "name": "Morning", "start_time": "06:00", "end_time": "14:00" },
        { "code": "Z", "name": "Zero", "start_time": "10:00", "end_time": "10:00" },
    ]});

    let app = common::build_test_app(pool.clone());
    let response = put_json(app, &manager, "/api/v1/shifts/windows", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_TIME_RANGE");
    assert_eq!(window_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reconcile_for_unknown_tenant_is_404(pool: PgPool) {
    let ghost = common::caller(1, 999_999, turnero_core::roles::ROLE_MANAGER);

    let app = common::build_test_app(pool);
    let response = put_json(app, &ghost, "/api/v1/shifts/windows", three_shifts()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolves_a_three_shift_day_including_the_night_wrap(pool: PgPool) {
    let (manager, staff) = tenant_with_callers(&pool).await;
    reconcile(&pool, &manager, three_shifts()).await;

    assert_eq!(resolved_code(&pool, &staff, "23:30").await, "N");
    assert_eq!(resolved_code(&pool, &staff, "05:00").await, "N");
    assert_eq!(resolved_code(&pool, &staff, "15:00").await, "T");
    assert_eq!(resolved_code(&pool, &staff, "09:15:30").await, "M");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gap_resolves_to_null(pool: PgPool) {
    let (manager, staff) = tenant_with_callers(&pool).await;
    reconcile(
        &pool,
        &manager,
        json!({ "shifts": [
            { "code": "M", "name": "Morning", "start_time": "06:00", "end_time": "14:00" },
        ]}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = get_as(app, &staff, "/api/v1/shifts/resolve?at=18:00").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["at"], "18:00:00");
    assert!(json["data"]["shift"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolve_without_time_uses_the_clock(pool: PgPool) {
    let (_, staff) = tenant_with_callers(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, &staff, "/api/v1/shifts/resolve").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["at"].is_string());
    assert!(json["data"]["shift"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_time_is_rejected(pool: PgPool) {
    let (_, staff) = tenant_with_callers(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, &staff, "/api/v1/shifts/resolve?at=25:61").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tenants_do_not_see_each_others_shifts(pool: PgPool) {
    let (manager, _) = tenant_with_callers(&pool).await;
    let (_, other_staff) = tenant_with_callers(&pool).await;
    reconcile(&pool, &manager, three_shifts()).await;

    let app = common::build_test_app(pool.clone());
    let response = get_as(app, &other_staff, "/api/v1/shifts/windows").await;

    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Configurations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_config_takes_over_reconciliation_once_activated(pool: PgPool) {
    let (manager, _) = tenant_with_callers(&pool).await;
    let original = reconcile(&pool, &manager, three_shifts()).await;
    let original_config = original["data"]["config_id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &manager,
        "/api/v1/shifts/configs",
        json!({ "name": "  Summer  ", "scheme_kind": "two_shifts" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let summer = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["name"], "Summer");
    assert_eq!(created["data"]["scheme_kind"], "two_shifts");
    assert_eq!(created["data"]["is_active"], false);

    // Still resolving against the original config until activation.
    assert_eq!(resolved_code(&pool, &manager, "07:00").await, "M");

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/shifts/configs/{summer}/activate");
    let response = post_empty(app, &manager, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], true);

    let app = common::build_test_app(pool.clone());
    let listed = body_json(get_as(app, &manager, "/api/v1/shifts/windows").await).await;
    assert!(listed["data"].as_array().unwrap().is_empty());

    let json = reconcile(
        &pool,
        &manager,
        json!({ "shifts": [
            { "code": "D", "name": "Day", "start_time": "07:00", "end_time": "19:00" },
            { "code": "N", "name": "Night", "start_time": "19:00", "end_time": "07:00" },
        ]}),
    )
    .await;
    assert_eq!(json["data"]["config_id"], summer);
    assert_eq!(json["data"]["created"], 2);
    assert_eq!(resolved_code(&pool, &manager, "07:00").await, "D");

    let app = common::build_test_app(pool.clone());
    let configs = body_json(get_as(app, &manager, "/api/v1/shifts/configs").await).await;
    let configs = configs["data"].as_array().unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0]["id"], summer);
    assert_eq!(configs[1]["id"], original_config);
    assert_eq!(configs[1]["is_active"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn config_creation_needs_a_manager_and_a_name(pool: PgPool) {
    let (manager, staff) = tenant_with_callers(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &staff, "/api/v1/shifts/configs", json!({ "name": "Winter" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &manager, "/api/v1/shifts/configs", json!({ "name": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &manager, "/api/v1/shifts/configs", json!({ "name": "Winter" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["scheme_kind"], "custom");
}

// ---------------------------------------------------------------------------
// Direct edits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn patch_validates_against_the_stored_bound(pool: PgPool) {
    let (manager, _) = tenant_with_callers(&pool).await;
    let json = reconcile(&pool, &manager, three_shifts()).await;
    let morning = json["data"]["windows"][0]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/shifts/windows/{morning}");

    // End equal to the stored start is a zero-length window.
    let app = common::build_test_app(pool.clone());
    let response = patch_json(app, &manager, &uri, json!({ "end_time": "06:00" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = patch_json(
        app,
        &manager,
        &uri,
        json!({ "end_time": "13:30", "name": "  Early  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["end_time"], "13:30:00");
    assert_eq!(json["data"]["name"], "Early");
    assert_eq!(json["data"]["code"], "M");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_window_twice_is_404(pool: PgPool) {
    let (manager, _) = tenant_with_callers(&pool).await;
    let json = reconcile(&pool, &manager, three_shifts()).await;
    let night = json["data"]["windows"][2]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/shifts/windows/{night}");

    let app = common::build_test_app(pool.clone());
    assert_eq!(delete(app, &manager, &uri).await.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    assert_eq!(delete(app, &manager, &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(window_count(&pool).await, 2);
}
