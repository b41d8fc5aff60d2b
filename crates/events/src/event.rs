//! Live event envelope pushed to WebSocket viewers.
//!
//! Serialized as `{"type": "...", "device_id": "...", "data": {...}}`.

use guardian_core::alert::AlertType;
use guardian_core::types::{DbId, Timestamp};
use serde::Serialize;

/// Payload of a `telemetry` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub temp_c: f64,
    pub recorded_at: Timestamp,
}

/// Payload of an `alert` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertData {
    pub alert_id: DbId,
    pub alert_type: AlertType,
    pub temp_c: f64,
    pub message: String,
}

/// A live update for one device.
///
/// `device_id` is the device's external identifier, matching the id
/// viewers subscribe with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveEvent {
    Telemetry {
        device_id: String,
        data: TelemetryData,
    },
    Alert {
        device_id: String,
        data: AlertData,
    },
}

impl LiveEvent {
    pub fn telemetry(device_id: impl Into<String>, temp_c: f64, recorded_at: Timestamp) -> Self {
        Self::Telemetry {
            device_id: device_id.into(),
            data: TelemetryData {
                temp_c,
                recorded_at,
            },
        }
    }

    pub fn alert(device_id: impl Into<String>, data: AlertData) -> Self {
        Self::Alert {
            device_id: device_id.into(),
            data,
        }
    }

    /// External id of the device the event belongs to.
    pub fn device_id(&self) -> &str {
        match self {
            Self::Telemetry { device_id, .. } | Self::Alert { device_id, .. } => device_id,
        }
    }

    /// Stable event type name, matching the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Telemetry { .. } => guardian_core::topics::MSG_TYPE_TELEMETRY,
            Self::Alert { .. } => guardian_core::topics::MSG_TYPE_ALERT,
        }
    }

    /// Serialize to the JSON text frame sent to viewers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
