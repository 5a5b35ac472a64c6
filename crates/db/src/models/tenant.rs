//! Tenant entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turnero_core::types::{TenantId, Timestamp};

/// A row from the `tenants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTenant {
    pub name: String,
}
