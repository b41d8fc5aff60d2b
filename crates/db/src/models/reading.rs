//! Temperature readings (append-only).

use guardian_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A single stored temperature sample.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Reading {
    pub id: DbId,
    pub device_id: DbId,
    pub temp_c: f64,
    /// Device-supplied sample time.
    pub recorded_at: Timestamp,
    /// Server ingestion time.
    pub received_at: Timestamp,
}

/// DTO for inserting a reading.
#[derive(Debug, Clone)]
pub struct CreateReading {
    pub device_id: DbId,
    pub temp_c: f64,
    pub recorded_at: Timestamp,
    pub received_at: Timestamp,
}
