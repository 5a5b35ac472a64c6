use std::sync::Arc;

use crate::config::ServerConfig;

/// Handler state: the Postgres pool plus the loaded configuration.
///
/// Handlers read `config.registry_retention_days` for sweeps; cloning only
/// bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub pool: turnero_db::DbPool,
    pub config: Arc<ServerConfig>,
}
