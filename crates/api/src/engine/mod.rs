//! Lifecycle engine services.
//!
//! Each service is a zero-sized struct whose async functions take the pool
//! and the tenant id explicitly, validate input synchronously, call the
//! repositories, and translate missing rows into [`CoreError::NotFound`].
//!
//! [`CoreError::NotFound`]: turnero_core::error::CoreError::NotFound

pub mod attendance_ranker;
pub mod booking_lifecycle;
pub mod registry_retention;
pub mod shift_registry;

pub use attendance_ranker::AttendanceRanker;
pub use booking_lifecycle::BookingLifecycleManager;
pub use registry_retention::RegistryRetentionStore;
pub use shift_registry::ShiftRegistry;

use sqlx::PgPool;
use turnero_core::error::CoreError;
use turnero_core::types::TenantId;
use turnero_db::repositories::TenantRepo;

use crate::error::AppResult;

/// Fail with `NotFound` unless the tenant exists.
pub(crate) async fn ensure_tenant(pool: &PgPool, tenant_id: TenantId) -> AppResult<()> {
    if TenantRepo::exists(pool, tenant_id).await? {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: "Tenant",
            id: tenant_id,
        }
        .into())
    }
}
