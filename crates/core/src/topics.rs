//! Well-known MQTT topic segments and live push message types.
//!
//! Device topics have the shape `<namespace>/<device_id>/telemetry`. The
//! message type constants are the `type` discriminators sent to WebSocket
//! viewers.

/// Default first topic segment (`egg/<device_id>/telemetry`).
pub const DEFAULT_TOPIC_NAMESPACE: &str = "egg";

/// Last topic segment for temperature readings.
pub const TELEMETRY_CHANNEL: &str = "telemetry";

/// Device id that addresses the "all devices" live group.
pub const ALL_DEVICES: &str = "all";

/// Push message carrying a new reading.
pub const MSG_TYPE_TELEMETRY: &str = "telemetry";

/// Push message carrying a triggered alert.
pub const MSG_TYPE_ALERT: &str = "alert";

/// Greeting sent once after a viewer connects.
pub const MSG_TYPE_CONNECTED: &str = "connected";

/// Application-level keepalive sent by viewers.
pub const MSG_TYPE_PING: &str = "ping";

/// Reply to [`MSG_TYPE_PING`].
pub const MSG_TYPE_PONG: &str = "pong";

/// Build the subscription filter for every device under `namespace`.
pub fn telemetry_filter(namespace: &str) -> String {
    format!("{namespace}/+/{TELEMETRY_CHANNEL}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_uses_single_level_wildcard() {
        assert_eq!(telemetry_filter("egg"), "egg/+/telemetry");
    }
}
