//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and the tenant id explicitly.
//! Multi-statement operations open their own transaction.

pub mod attendance_repo;
pub mod booking_repo;
pub mod registry_repo;
pub mod shift_config_repo;
pub mod shift_window_repo;
pub mod staff_repo;
pub mod tenant_repo;

pub use attendance_repo::AttendanceRepo;
pub use booking_repo::BookingRepo;
pub use registry_repo::RegistryRepo;
pub use shift_config_repo::ShiftConfigRepo;
pub use shift_window_repo::ShiftWindowRepo;
pub use staff_repo::StaffRepo;
pub use tenant_repo::TenantRepo;

/// Take a transaction-scoped advisory lock. Released on commit or rollback.
pub(crate) async fn advisory_xact_lock(
    conn: &mut sqlx::PgConnection,
    key: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}
