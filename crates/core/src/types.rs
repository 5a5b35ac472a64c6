/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Opaque tenant identifier supplied by the authentication layer.
pub type TenantId = DbId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
