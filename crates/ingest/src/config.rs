use std::time::Duration;

use guardian_core::topics::DEFAULT_TOPIC_NAMESPACE;

use crate::pipeline::PipelineSettings;
use crate::retry::RetryPolicy;

/// Ingestion configuration loaded from environment variables.
///
/// Defaults target a broker on the local machine.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Broker host name (default: `localhost`).
    pub broker_host: String,
    /// Broker port (default: `1883`).
    pub broker_port: u16,
    /// MQTT client id (default: `guardian-ingest`).
    pub client_id: String,
    /// First topic segment devices publish under (default: `egg`).
    pub topic_namespace: String,
    /// Pause between a lost connection and the next attempt (default: 5s).
    pub reconnect_delay: Duration,
    /// Maximum messages processed concurrently (default: `64`).
    pub max_in_flight: usize,
    /// Per-message processing deadline (default: 10s).
    pub processing_timeout: Duration,
    /// Attempts per store write, including the first (default: `3`).
    pub store_retry_attempts: u32,
    /// Delay before the first retry; doubles each time (default: 100ms).
    pub store_retry_base: Duration,
    /// Create unknown devices on first message (default: `false`).
    pub auto_register_devices: bool,
    /// Live events buffered per viewer before the oldest is dropped
    /// (default: `64`).
    pub live_buffer_capacity: usize,
}

impl IngestConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default           |
    /// |--------------------------------|-------------------|
    /// | `MQTT_BROKER`                  | `localhost`       |
    /// | `MQTT_PORT`                    | `1883`            |
    /// | `MQTT_CLIENT_ID`               | `guardian-ingest` |
    /// | `MQTT_TOPIC_NAMESPACE`         | `egg`             |
    /// | `MQTT_RECONNECT_DELAY_SECS`    | `5`               |
    /// | `INGEST_MAX_IN_FLIGHT`         | `64`              |
    /// | `INGEST_PROCESSING_TIMEOUT_MS` | `10000`           |
    /// | `INGEST_STORE_RETRY_ATTEMPTS`  | `3`               |
    /// | `INGEST_STORE_RETRY_BASE_MS`   | `100`             |
    /// | `AUTO_REGISTER_DEVICES`        | `false`           |
    /// | `LIVE_BUFFER_CAPACITY`         | `64`              |
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let broker_host = std::env::var("MQTT_BROKER").unwrap_or_else(|_| "localhost".into());

        let broker_port: u16 = std::env::var("MQTT_PORT")
            .unwrap_or_else(|_| "1883".into())
            .parse()
            .expect("MQTT_PORT must be a valid u16");

        let client_id =
            std::env::var("MQTT_CLIENT_ID").unwrap_or_else(|_| "guardian-ingest".into());

        let topic_namespace = std::env::var("MQTT_TOPIC_NAMESPACE")
            .unwrap_or_else(|_| DEFAULT_TOPIC_NAMESPACE.into());

        let reconnect_delay_secs: u64 = std::env::var("MQTT_RECONNECT_DELAY_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("MQTT_RECONNECT_DELAY_SECS must be a valid u64");

        let max_in_flight: usize = std::env::var("INGEST_MAX_IN_FLIGHT")
            .unwrap_or_else(|_| "64".into())
            .parse()
            .expect("INGEST_MAX_IN_FLIGHT must be a valid usize");

        let processing_timeout_ms: u64 = std::env::var("INGEST_PROCESSING_TIMEOUT_MS")
            .unwrap_or_else(|_| "10000".into())
            .parse()
            .expect("INGEST_PROCESSING_TIMEOUT_MS must be a valid u64");

        let store_retry_attempts: u32 = std::env::var("INGEST_STORE_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("INGEST_STORE_RETRY_ATTEMPTS must be a valid u32");

        let store_retry_base_ms: u64 = std::env::var("INGEST_STORE_RETRY_BASE_MS")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("INGEST_STORE_RETRY_BASE_MS must be a valid u64");

        let auto_register_devices: bool = std::env::var("AUTO_REGISTER_DEVICES")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("AUTO_REGISTER_DEVICES must be true or false");

        let live_buffer_capacity: usize = std::env::var("LIVE_BUFFER_CAPACITY")
            .unwrap_or_else(|_| "64".into())
            .parse()
            .expect("LIVE_BUFFER_CAPACITY must be a valid usize");

        assert!(max_in_flight > 0, "INGEST_MAX_IN_FLIGHT must be positive");
        assert!(live_buffer_capacity > 0, "LIVE_BUFFER_CAPACITY must be positive");

        Self {
            broker_host,
            broker_port,
            client_id,
            topic_namespace,
            reconnect_delay: Duration::from_secs(reconnect_delay_secs),
            max_in_flight,
            processing_timeout: Duration::from_millis(processing_timeout_ms),
            store_retry_attempts: store_retry_attempts.max(1),
            store_retry_base: Duration::from_millis(store_retry_base_ms),
            auto_register_devices,
            live_buffer_capacity,
        }
    }

    /// The subset of settings the pipeline needs.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            topic_namespace: self.topic_namespace.clone(),
            retry: RetryPolicy {
                attempts: self.store_retry_attempts,
                base_delay: self.store_retry_base,
            },
            processing_timeout: self.processing_timeout,
            auto_register_devices: self.auto_register_devices,
        }
    }
}
