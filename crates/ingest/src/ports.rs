//! Store and registry seams used by the ingestion pipeline.
//!
//! Production wires these to PostgreSQL ([`crate::pg::PgStores`]); tests
//! substitute in-memory implementations.

use std::future::Future;

use guardian_core::alert::{NewAlert, RuleBounds};
use guardian_core::types::{DbId, Timestamp};
use guardian_db::models::device::Device;
use guardian_db::models::reading::{CreateReading, Reading};

/// Failure of a store or registry call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Transient: connection loss, pool exhaustion, I/O. Worth retrying.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Permanent: the store refused the write (constraint violation etc.).
    #[error("Store rejected write: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Append-only temperature readings.
pub trait ReadingStore: Send + Sync {
    /// Persist one reading and return its id.
    fn append_reading(
        &self,
        reading: &CreateReading,
    ) -> impl Future<Output = Result<DbId, StoreError>> + Send;

    /// Readings of `device_id` recorded at or after `since`, ascending by
    /// `recorded_at`.
    ///
    /// This is the contract the HTTP history endpoint serves; it reads the
    /// same window through `ReadingRepo::list_recent_since`, which adds a
    /// newest-N cap on top.
    fn query_readings(
        &self,
        device_id: DbId,
        since: Timestamp,
    ) -> impl Future<Output = Result<Vec<Reading>, StoreError>> + Send;
}

/// Triggered alerts.
pub trait AlertStore: Send + Sync {
    /// Persist one alert and return its id.
    fn append_alert(&self, alert: &NewAlert)
        -> impl Future<Output = Result<DbId, StoreError>> + Send;
}

/// Device lookup and rule loading.
pub trait DeviceRegistry: Send + Sync {
    /// Look a device up by external id. Inactive devices are returned too;
    /// the caller decides what to do with them.
    fn resolve_device_id(
        &self,
        external_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, StoreError>> + Send;

    /// Active rules of a device.
    fn active_rules_for(
        &self,
        device_id: DbId,
    ) -> impl Future<Output = Result<Vec<RuleBounds>, StoreError>> + Send;

    /// Create a device for an unseen external id, or return the existing one.
    fn register_device(
        &self,
        external_id: &str,
    ) -> impl Future<Output = Result<Device, StoreError>> + Send;
}

/// Everything the pipeline writes through.
pub trait IngestStores: ReadingStore + AlertStore + DeviceRegistry {}

impl<T: ReadingStore + AlertStore + DeviceRegistry> IngestStores for T {}

/// Display name given to devices created by auto-registration.
pub fn auto_registered_name(external_id: &str) -> String {
    format!("Auto-registered: {external_id}")
}
