//! Conventions every migration must keep.

use sqlx::PgPool;

/// Tables scoped to a tenant by their own column. `shift_windows` is
/// scoped through its configuration.
const TENANT_SCOPED: [&str; 5] = [
    "shift_configs",
    "staff_members",
    "bookings",
    "attendance_records",
    "daily_shift_registries",
];

async fn base_tables(pool: &PgPool) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT table_name::TEXT FROM information_schema.tables
         WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
           AND table_name <> '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

async fn column_type(pool: &PgPool, table: &str, column: &str) -> Option<(String, String)> {
    sqlx::query_as(
        "SELECT data_type::TEXT, is_nullable::TEXT FROM information_schema.columns
         WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
    )
    .bind(table)
    .bind(column)
    .fetch_optional(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ids_are_bigint_and_timestamps_are_timestamptz(pool: PgPool) {
    let tables = base_tables(&pool).await;
    assert_eq!(tables.len(), 7);

    for table in &tables {
        let (id_type, _) = column_type(&pool, table, "id").await.unwrap();
        assert_eq!(id_type, "bigint", "{table}.id");

        for column in ["created_at", "updated_at"] {
            let (data_type, _) = column_type(&pool, table, column)
                .await
                .unwrap_or_else(|| panic!("{table} lacks {column}"));
            assert_eq!(data_type, "timestamp with time zone", "{table}.{column}");
        }
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tenant_scoped_tables_require_a_tenant(pool: PgPool) {
    for table in TENANT_SCOPED {
        let (data_type, nullable) = column_type(&pool, table, "tenant_id")
            .await
            .unwrap_or_else(|| panic!("{table} lacks tenant_id"));
        assert_eq!(data_type, "bigint", "{table}.tenant_id");
        assert_eq!(nullable, "NO", "{table}.tenant_id must be NOT NULL");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn every_table_maintains_updated_at(pool: PgPool) {
    let with_trigger: Vec<String> = sqlx::query_scalar(
        "SELECT event_object_table::TEXT FROM information_schema.triggers
         WHERE trigger_name = 'set_updated_at' AND event_manipulation = 'UPDATE'
         ORDER BY event_object_table",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(with_trigger, base_tables(&pool).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unique_indexes_use_the_uq_prefix(pool: PgPool) {
    // The API maps unique violations to 409 only for `uq_*` names.
    let offenders: Vec<String> = sqlx::query_scalar(
        "SELECT i.relname::TEXT FROM pg_index x
         JOIN pg_class i ON i.oid = x.indexrelid
         JOIN pg_class t ON t.oid = x.indrelid
         JOIN pg_namespace n ON n.oid = t.relnamespace
         WHERE n.nspname = 'public' AND x.indisunique AND NOT x.indisprimary
           AND t.relname <> '_sqlx_migrations'
           AND i.relname NOT LIKE 'uq\\_%'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(offenders.is_empty(), "unique indexes without uq_ prefix: {offenders:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name::TEXT, column_name::TEXT FROM information_schema.columns
         WHERE table_schema = 'public' AND data_type = 'character varying'
           AND table_name <> '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "varchar columns: {rows:?}");
}
