//! Repository for the `devices` table.

use guardian_core::types::DbId;
use sqlx::PgPool;

use crate::models::device::{CreateDevice, Device};

/// Column list for `devices` queries.
const COLUMNS: &str = "id, device_id, name, description, is_active, created_at, updated_at";

/// Provides lookup and registration for devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Find a device by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE id = $1");
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a device by its external identifier.
    pub async fn find_by_device_id(
        pool: &PgPool,
        device_id: &str,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE device_id = $1");
        sqlx::query_as::<_, Device>(&query)
            .bind(device_id)
            .fetch_optional(pool)
            .await
    }

    /// Register a new device. Fails with a `uq_devices_device_id` violation
    /// if the external id is taken.
    pub async fn create(pool: &PgPool, dto: &CreateDevice) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices (device_id, name, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(&dto.device_id)
            .bind(&dto.name)
            .bind(&dto.description)
            .fetch_one(pool)
            .await
    }

    /// Return the device for `device_id`, creating it when missing.
    ///
    /// Safe under concurrent first messages from the same device: the
    /// conflicting insert resolves to the existing row.
    pub async fn find_or_create(
        pool: &PgPool,
        device_id: &str,
        name: &str,
    ) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices (device_id, name) \
             VALUES ($1, $2) \
             ON CONFLICT (device_id) DO UPDATE SET device_id = EXCLUDED.device_id \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(device_id)
            .bind(name)
            .fetch_one(pool)
            .await
    }
}
