//! Device registry entity.

use guardian_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered sensor device.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    /// Stable external identifier used in MQTT topics and payloads.
    pub device_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a device.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDevice {
    pub device_id: String,
    pub name: String,
    pub description: Option<String>,
}
