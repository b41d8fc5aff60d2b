//! Triggered threshold alerts.

use guardian_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A persisted threshold crossing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub device_id: DbId,
    /// `None` once the originating rule has been deleted.
    pub rule_id: Option<DbId>,
    pub temp_c: f64,
    /// `"high"` or `"low"`.
    pub alert_type: String,
    pub message: String,
    pub triggered_at: Timestamp,
    pub is_acknowledged: bool,
    pub acknowledged_at: Option<Timestamp>,
}

/// Filter for alert listings.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub unacknowledged_only: bool,
    pub device_id: Option<DbId>,
    pub limit: i64,
}
