//! Periodic purge of old readings.
//!
//! Only runs when `READING_RETENTION_DAYS` is set. Alerts are kept: they
//! do not reference readings.

use std::time::Duration;

use chrono::Utc;
use guardian_db::repositories::ReadingRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Delete readings recorded more than `retention_days` ago, then every
/// `interval` until `cancel` fires.
pub async fn run(pool: PgPool, retention_days: i64, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        retention_days,
        interval_secs = interval.as_secs(),
        "Reading retention job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reading retention job stopping");
                break;
            }
            _ = ticker.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                match ReadingRepo::delete_older_than(&pool, cutoff).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, %cutoff, "Reading retention: purged old rows");
                    }
                    Ok(_) => tracing::debug!("Reading retention: no rows to purge"),
                    Err(e) => {
                        tracing::error!(error = %e, "Reading retention: cleanup failed");
                    }
                }
            }
        }
    }
}
