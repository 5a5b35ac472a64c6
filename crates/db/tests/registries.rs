//! Integration tests for daily shift registries and their retention
//! lifecycle (`present -> trashed -> purged`, `trashed -> present`).

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use turnero_core::booking::REGISTRATION_ARCHIVED;
use turnero_core::registry::{sweep_cutoff, RetentionState, DEFAULT_RETENTION_DAYS};
use turnero_core::shift_reconcile::ShiftSpec;
use turnero_core::time_window::parse_time_of_day;
use turnero_core::types::{DbId, TenantId};
use turnero_db::models::booking::CreateBooking;
use turnero_db::models::tenant::CreateTenant;
use turnero_db::repositories::{BookingRepo, RegistryRepo, ShiftWindowRepo, TenantRepo};

const ACTOR: DbId = 42;

async fn setup(pool: &PgPool) -> (TenantId, DbId) {
    let tenant = TenantRepo::create(
        pool,
        &CreateTenant {
            name: "Club Oeste".into(),
        },
    )
    .await
    .unwrap()
    .id;
    let outcome = ShiftWindowRepo::reconcile(
        pool,
        tenant,
        vec![ShiftSpec {
            code: "T".into(),
            name: "Tarde".into(),
            start_time: parse_time_of_day("14:00").unwrap(),
            end_time: parse_time_of_day("22:00").unwrap(),
            color: None,
            sort_order: 0,
            is_active: true,
        }],
        None,
    )
    .await
    .unwrap();
    (tenant, outcome.windows[0].id)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

async fn book(pool: &PgPool, tenant: TenantId, shift: DbId, start: &str, end: &str, staff: &[DbId]) -> DbId {
    let input = CreateBooking {
        booking_date: day(),
        start_time: parse_time_of_day(start).unwrap(),
        end_time: parse_time_of_day(end).unwrap(),
        court_id: None,
        staff_ids: staff.to_vec(),
        shift_window_id: Some(shift),
        notes: None,
    };
    BookingRepo::create(pool, tenant, &input, staff, Some(shift), None)
        .await
        .unwrap()
        .id
}

async fn backdate_deletion(pool: &PgPool, id: DbId, days: i64) {
    sqlx::query("UPDATE daily_shift_registries SET deleted_at = $2 WHERE id = $1")
        .bind(id)
        .bind(Utc::now() - Duration::days(days))
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn closing_a_shift_snapshots_and_archives_bookings(pool: PgPool) {
    let (tenant, shift) = setup(&pool).await;
    let a = book(&pool, tenant, shift, "14:00", "15:30", &[]).await;
    let b = book(&pool, tenant, shift, "16:00", "17:00", &[]).await;
    BookingRepo::complete(&pool, tenant, a).await.unwrap();

    let registry = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR).await.unwrap();
    assert_eq!(registry.booking_ids, vec![a, b]);
    assert_eq!(registry.total_bookings, 2);
    assert_eq!(registry.completed_bookings, 1);
    assert_eq!(registry.in_progress_bookings, 1);
    assert_eq!(registry.booked_minutes, 150);
    assert_eq!(registry.retention().unwrap(), RetentionState::Present);

    let archived = BookingRepo::find_by_id(&pool, tenant, b).await.unwrap().unwrap();
    assert_eq!(archived.registration, REGISTRATION_ARCHIVED);

    // Only one live registry per (shift, date).
    let err = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR)
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db) => {
            assert_eq!(db.constraint(), Some("uq_daily_registries_tenant_shift_date"))
        }
        other => panic!("expected a unique violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_delete_then_restore_returns_to_listing(pool: PgPool) {
    let (tenant, shift) = setup(&pool).await;
    let registry = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR).await.unwrap();

    assert!(RegistryRepo::soft_delete(&pool, tenant, registry.id, ACTOR).await.unwrap());
    assert!(!RegistryRepo::soft_delete(&pool, tenant, registry.id, ACTOR).await.unwrap());
    assert!(RegistryRepo::find_by_id(&pool, tenant, registry.id).await.unwrap().is_none());
    assert!(RegistryRepo::list(&pool, tenant).await.unwrap().is_empty());

    let trashed = RegistryRepo::list_trashed(&pool, tenant).await.unwrap();
    assert_eq!(trashed.len(), 1);
    assert!(matches!(
        trashed[0].retention().unwrap(),
        RetentionState::Trashed { by: ACTOR, .. }
    ));

    assert!(RegistryRepo::restore(&pool, tenant, registry.id).await.unwrap());
    assert!(!RegistryRepo::restore(&pool, tenant, registry.id).await.unwrap());
    assert_eq!(RegistryRepo::list(&pool, tenant).await.unwrap().len(), 1);
    assert!(RegistryRepo::list_trashed(&pool, tenant).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_delete_then_purge_is_gone(pool: PgPool) {
    let (tenant, shift) = setup(&pool).await;
    let registry = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR).await.unwrap();

    RegistryRepo::soft_delete(&pool, tenant, registry.id, ACTOR).await.unwrap();
    assert!(RegistryRepo::hard_delete(&pool, tenant, registry.id).await.unwrap());
    assert!(RegistryRepo::find_by_id_include_deleted(&pool, tenant, registry.id)
        .await
        .unwrap()
        .is_none());
    assert!(RegistryRepo::list_trashed(&pool, tenant).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn trash_lists_newest_deletion_first(pool: PgPool) {
    let (tenant, shift) = setup(&pool).await;
    let first = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR).await.unwrap();
    RegistryRepo::soft_delete(&pool, tenant, first.id, ACTOR).await.unwrap();
    backdate_deletion(&pool, first.id, 2).await;

    let second = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR).await.unwrap();
    RegistryRepo::soft_delete(&pool, tenant, second.id, ACTOR).await.unwrap();

    let ids: Vec<_> = RegistryRepo::list_trashed(&pool, tenant)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_entries_past_retention_are_expired(pool: PgPool) {
    let (tenant, shift) = setup(&pool).await;
    let old = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR).await.unwrap();
    RegistryRepo::soft_delete(&pool, tenant, old.id, ACTOR).await.unwrap();
    backdate_deletion(&pool, old.id, DEFAULT_RETENTION_DAYS + 1).await;

    let recent = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR).await.unwrap();
    RegistryRepo::soft_delete(&pool, tenant, recent.id, ACTOR).await.unwrap();
    backdate_deletion(&pool, recent.id, DEFAULT_RETENTION_DAYS - 1).await;

    let live = RegistryRepo::close_shift(&pool, tenant, shift, day(), ACTOR).await.unwrap();

    let cutoff = sweep_cutoff(Utc::now(), DEFAULT_RETENTION_DAYS);
    let expired = RegistryRepo::list_expired(&pool, Some(tenant), cutoff).await.unwrap();
    assert_eq!(expired, vec![old.id]);
    assert_eq!(RegistryRepo::list_expired(&pool, None, cutoff).await.unwrap(), vec![old.id]);

    assert!(RegistryRepo::purge_expired(&pool, old.id, cutoff).await.unwrap());
    // Not expired, so the guarded purge refuses.
    assert!(!RegistryRepo::purge_expired(&pool, recent.id, cutoff).await.unwrap());
    assert!(!RegistryRepo::purge_expired(&pool, live.id, cutoff).await.unwrap());

    assert_eq!(RegistryRepo::list_trashed(&pool, tenant).await.unwrap().len(), 1);
    assert_eq!(RegistryRepo::list(&pool, tenant).await.unwrap().len(), 1);
}
