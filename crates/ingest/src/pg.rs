//! PostgreSQL implementation of the ingestion ports.

use guardian_core::alert::{NewAlert, RuleBounds};
use guardian_core::types::{DbId, Timestamp};
use guardian_db::models::device::Device;
use guardian_db::models::reading::{CreateReading, Reading};
use guardian_db::repositories::{AlertRepo, AlertRuleRepo, DeviceRepo, ReadingRepo};
use guardian_db::DbPool;

use crate::ports::{auto_registered_name, AlertStore, DeviceRegistry, ReadingStore, StoreError};

/// All ingestion ports backed by one connection pool.
#[derive(Clone)]
pub struct PgStores {
    pool: DbPool,
}

impl PgStores {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Split sqlx failures into retryable and permanent ones.
///
/// Connection, pool and I/O problems are transient. Anything the server
/// answered with (constraint violations, bad data) is permanent.
pub fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        other => StoreError::Rejected(other.to_string()),
    }
}

impl ReadingStore for PgStores {
    async fn append_reading(&self, reading: &CreateReading) -> Result<DbId, StoreError> {
        ReadingRepo::insert(&self.pool, reading)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn query_readings(
        &self,
        device_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<Reading>, StoreError> {
        ReadingRepo::list_since(&self.pool, device_id, since)
            .await
            .map_err(classify_sqlx_error)
    }
}

impl AlertStore for PgStores {
    async fn append_alert(&self, alert: &NewAlert) -> Result<DbId, StoreError> {
        AlertRepo::insert(&self.pool, alert)
            .await
            .map_err(classify_sqlx_error)
    }
}

impl DeviceRegistry for PgStores {
    async fn resolve_device_id(&self, external_id: &str) -> Result<Option<Device>, StoreError> {
        DeviceRepo::find_by_device_id(&self.pool, external_id)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn active_rules_for(&self, device_id: DbId) -> Result<Vec<RuleBounds>, StoreError> {
        let rules = AlertRuleRepo::list_active_for_device(&self.pool, device_id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rules.iter().map(RuleBounds::from).collect())
    }

    async fn register_device(&self, external_id: &str) -> Result<Device, StoreError> {
        DeviceRepo::find_or_create(&self.pool, external_id, &auto_registered_name(external_id))
            .await
            .map_err(classify_sqlx_error)
    }
}
