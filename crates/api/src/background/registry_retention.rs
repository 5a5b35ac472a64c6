//! Periodic purge of daily shift registries that have sat in the trash
//! longer than the retention period, across every tenant.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::engine::RegistryRetentionStore;

/// Run the retention sweep loop until `cancel` is triggered.
///
/// The first sweep runs immediately; later ones every `interval`.
pub async fn run(pool: PgPool, retention_days: i64, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        retention_days,
        interval_secs = interval.as_secs(),
        "Registry retention job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Registry retention job stopping");
                break;
            }
            _ = ticker.tick() => {
                match RegistryRetentionStore::sweep_expired(&pool, None, retention_days, Utc::now()).await {
                    Ok(report) => {
                        if report.purged > 0 || !report.errors.is_empty() {
                            tracing::info!(
                                purged = report.purged,
                                failed = report.errors.len(),
                                "Registry retention: sweep complete"
                            );
                        } else {
                            tracing::debug!("Registry retention: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Registry retention: sweep failed");
                    }
                }
            }
        }
    }
}
