//! Temperature alert rule engine.
//!
//! Pure logic, no database access. The caller loads the device's rules and
//! passes them in together with the reading that was just stored; the
//! engine yields one [`NewAlert`] per rule the reading falls outside of.
//!
//! Evaluation is stateless: there is no cooldown or "already alerting"
//! suppression, so every qualifying reading produces a fresh alert.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Which side of the band a reading fell out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// Reading is above `temp_max`.
    High,
    /// Reading is below `temp_min`.
    Low,
}

impl AlertType {
    /// Value stored in the `alerts.alert_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("HIGH"),
            Self::Low => f.write_str("LOW"),
        }
    }
}

/// A rule definition used by the evaluator.
#[derive(Debug, Clone)]
pub struct RuleBounds {
    pub rule_id: DbId,
    pub device_id: DbId,
    pub temp_min: f64,
    pub temp_max: f64,
    pub is_active: bool,
}

/// The fields of a stored reading the evaluator needs.
#[derive(Debug, Clone, Copy)]
pub struct ReadingSnapshot {
    pub device_id: DbId,
    pub temp_c: f64,
    /// Server ingestion time; becomes the alert's `triggered_at`.
    pub received_at: Timestamp,
}

/// An alert produced by the engine that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlert {
    pub device_id: DbId,
    pub rule_id: DbId,
    pub temp_c: f64,
    pub alert_type: AlertType,
    pub message: String,
    pub triggered_at: Timestamp,
}

/// Evaluate a reading against a device's rules.
///
/// Rules that are inactive or belong to another device are skipped. For each
/// remaining rule at most one alert is produced: `High` when
/// `temp_c > temp_max`, otherwise `Low` when `temp_c < temp_min`. Readings
/// equal to a bound are in range.
pub fn evaluate<'a>(
    reading: ReadingSnapshot,
    rules: &'a [RuleBounds],
) -> impl Iterator<Item = NewAlert> + 'a {
    rules
        .iter()
        .filter(move |rule| rule.is_active && rule.device_id == reading.device_id)
        .filter_map(move |rule| check_rule(&reading, rule))
}

/// Compare a reading against a single rule.
fn check_rule(reading: &ReadingSnapshot, rule: &RuleBounds) -> Option<NewAlert> {
    let (alert_type, bound) = if reading.temp_c > rule.temp_max {
        (AlertType::High, rule.temp_max)
    } else if reading.temp_c < rule.temp_min {
        (AlertType::Low, rule.temp_min)
    } else {
        return None;
    };

    Some(NewAlert {
        device_id: reading.device_id,
        rule_id: rule.rule_id,
        temp_c: reading.temp_c,
        alert_type,
        message: alert_message(alert_type, reading.temp_c, bound),
        triggered_at: reading.received_at,
    })
}

/// Human-readable alert text. Deterministic for the same inputs.
pub fn alert_message(alert_type: AlertType, temp_c: f64, bound: f64) -> String {
    format!("{alert_type} temperature: {temp_c}°C (threshold: {bound})")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
