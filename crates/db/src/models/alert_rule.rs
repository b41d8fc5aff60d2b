//! Per-device temperature band rules.

use guardian_core::alert::RuleBounds;
use guardian_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A min/max band evaluated against every reading of its device.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertRule {
    pub id: DbId,
    pub device_id: DbId,
    pub temp_min: f64,
    pub temp_max: f64,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl From<&AlertRule> for RuleBounds {
    fn from(rule: &AlertRule) -> Self {
        RuleBounds {
            rule_id: rule.id,
            device_id: rule.device_id,
            temp_min: rule.temp_min,
            temp_max: rule.temp_max,
            is_active: rule.is_active,
        }
    }
}

/// DTO for creating a rule. The device comes from the route path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertRule {
    pub temp_min: f64,
    pub temp_max: f64,
}
