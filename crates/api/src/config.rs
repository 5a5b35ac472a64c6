//! Server configuration from the environment.

use std::fmt::Debug;
use std::str::FromStr;

use turnero_core::registry::DEFAULT_RETENTION_DAYS;

use crate::auth::jwt::JwtConfig;

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

/// Everything the binary needs to start. Only `DATABASE_URL` and
/// `JWT_SECRET` are required.
///
/// | Env var                        | Default                 |
/// |--------------------------------|-------------------------|
/// | `HOST`                         | `0.0.0.0`               |
/// | `PORT`                         | `3000`                  |
/// | `CORS_ORIGINS`                 | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS`        | `30`                    |
/// | `DATABASE_URL`                 | required                |
/// | `DB_MAX_CONNECTIONS`           | `10`                    |
/// | `REGISTRY_RETENTION_DAYS`      | `30`                    |
/// | `REGISTRY_SWEEP_INTERVAL_SECS` | `3600`                  |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Grace period for the retention job once shutdown starts.
    pub shutdown_timeout_secs: u64,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Trashed registries older than this many days are purged.
    pub registry_retention_days: i64,
    pub registry_sweep_interval_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// # Panics
    ///
    /// On a missing required variable, an unparseable value, a retention
    /// below one day or a zero sweep interval.
    pub fn from_env() -> Self {
        let registry_retention_days = parse_env("REGISTRY_RETENTION_DAYS", DEFAULT_RETENTION_DAYS);
        assert!(
            registry_retention_days >= 1,
            "REGISTRY_RETENTION_DAYS must be at least 1, got {registry_retention_days}"
        );

        let registry_sweep_interval_secs =
            parse_env("REGISTRY_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS);
        assert!(
            registry_sweep_interval_secs >= 1,
            "REGISTRY_SWEEP_INTERVAL_SECS must be at least 1"
        );

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_env("PORT", 3000),
            cors_origins: split_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT_SECS", 30),
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10),
            registry_retention_days,
            registry_sweep_interval_secs,
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Read `key`, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e:?}")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
