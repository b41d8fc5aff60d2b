//! Shared query parameter types for API handlers.

use guardian_core::types::DbId;
use serde::Deserialize;

/// Default window for telemetry history, in hours.
pub const DEFAULT_TELEMETRY_HOURS: i64 = 24;
/// Largest telemetry window, in hours (one week).
pub const MAX_TELEMETRY_HOURS: i64 = 168;
/// Default number of readings returned.
pub const DEFAULT_TELEMETRY_LIMIT: i64 = 1000;
/// Largest number of readings returned.
pub const MAX_TELEMETRY_LIMIT: i64 = 10_000;

/// Default page size for the global alert list.
pub const DEFAULT_ALERT_LIMIT: i64 = 50;
/// Default page size for a device's alert list.
pub const DEFAULT_DEVICE_ALERT_LIMIT: i64 = 20;
/// Largest alert page size.
pub const MAX_ALERT_LIMIT: i64 = 500;

/// `?hours=&limit=` for telemetry history.
#[derive(Debug, Deserialize)]
pub struct TelemetryParams {
    pub hours: Option<i64>,
    pub limit: Option<i64>,
}

/// `?limit=&unacknowledged_only=` for the global alert list.
#[derive(Debug, Deserialize)]
pub struct AlertListParams {
    pub limit: Option<i64>,
    #[serde(default)]
    pub unacknowledged_only: bool,
}

/// `?limit=` for a device's alert list.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

/// `?device_id=` to scope a bulk acknowledge to one device.
#[derive(Debug, Deserialize)]
pub struct AcknowledgeAllParams {
    pub device_id: Option<DbId>,
}

/// Clamp an alert page size into `1..=MAX_ALERT_LIMIT`.
pub fn clamp_alert_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_ALERT_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_limit_is_clamped() {
        assert_eq!(clamp_alert_limit(None, DEFAULT_ALERT_LIMIT), 50);
        assert_eq!(clamp_alert_limit(Some(0), DEFAULT_ALERT_LIMIT), 1);
        assert_eq!(clamp_alert_limit(Some(-5), DEFAULT_ALERT_LIMIT), 1);
        assert_eq!(clamp_alert_limit(Some(10_000), DEFAULT_ALERT_LIMIT), 500);
        assert_eq!(clamp_alert_limit(Some(75), DEFAULT_ALERT_LIMIT), 75);
    }
}
