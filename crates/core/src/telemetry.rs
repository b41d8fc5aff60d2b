//! Decoding of raw device telemetry messages.
//!
//! Pure logic: the MQTT loop hands over the topic string and payload bytes,
//! and this module either produces a [`DecodedReading`] or an
//! [`IngestError`] describing why the message must be dropped.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::topics::TELEMETRY_CHANNEL;
use crate::types::{to_stored_precision, Timestamp};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single inbound message was not ingested.
///
/// None of these are fatal to the ingestion loop; the message is dropped,
/// logged and counted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("Malformed topic: {0}")]
    MalformedTopic(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Processing timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
}

impl IngestError {
    /// Stable short name, used as a log field and counter key.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedTopic(_) => "malformed_topic",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::UnknownDevice(_) => "unknown_device",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Timeout { .. } => "timeout",
        }
    }
}

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// Extract the device external id from `<namespace>/<device_id>/telemetry`.
pub fn parse_topic<'a>(topic: &'a str, namespace: &str) -> Result<&'a str, IngestError> {
    let mut parts = topic.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(ns), Some(device_id), Some(channel), None)
            if ns == namespace && channel == TELEMETRY_CHANNEL && !device_id.is_empty() =>
        {
            Ok(device_id)
        }
        _ => Err(IngestError::MalformedTopic(format!(
            "expected '{namespace}/<device_id>/{TELEMETRY_CHANNEL}', got '{topic}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Wire shape of a device message. All fields are required.
#[derive(Debug, Deserialize)]
struct TelemetryPayload {
    device_id: String,
    ts: String,
    temp_c: f64,
}

/// A validated, normalized device reading that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReading {
    /// External device identifier as reported by the device.
    pub external_id: String,
    /// Device-supplied sample time.
    pub recorded_at: Timestamp,
    /// Temperature in degrees Celsius.
    pub temp_c: f64,
}

/// Decode a JSON payload into a [`DecodedReading`].
pub fn decode_payload(raw: &[u8]) -> Result<DecodedReading, IngestError> {
    let payload: TelemetryPayload = serde_json::from_slice(raw)
        .map_err(|e| IngestError::MalformedPayload(format!("invalid JSON: {e}")))?;

    if payload.device_id.is_empty() {
        return Err(IngestError::MalformedPayload(
            "device_id must not be empty".to_string(),
        ));
    }
    if !payload.temp_c.is_finite() {
        return Err(IngestError::MalformedPayload(format!(
            "temp_c must be finite, got {}",
            payload.temp_c
        )));
    }

    Ok(DecodedReading {
        external_id: payload.device_id,
        recorded_at: parse_timestamp(&payload.ts)?,
        temp_c: payload.temp_c,
    })
}

/// Parse an ISO-8601 timestamp.
///
/// RFC 3339 strings keep their offset. Strings without an offset are
/// taken as UTC. Digits below a microsecond are dropped.
pub fn parse_timestamp(ts: &str) -> Result<Timestamp, IngestError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(to_stored_precision(dt.with_timezone(&Utc)));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .map(|naive| to_stored_precision(Utc.from_utc_datetime(&naive)))
        .ok_or_else(|| IngestError::MalformedPayload(format!("invalid ts '{ts}'")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
