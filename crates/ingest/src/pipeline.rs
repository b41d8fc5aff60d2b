//! Per-message ingestion: decode, persist, evaluate, persist alerts,
//! broadcast.
//!
//! A malformed, unknown or unstorable message leaves no reading behind and
//! is reported as an [`IngestError`]. Alert rules that cannot be loaded do
//! not stop the reading from being stored and broadcast.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use guardian_core::alert::{evaluate, NewAlert, ReadingSnapshot};
use guardian_core::telemetry::{decode_payload, parse_topic, IngestError};
use guardian_core::topics::DEFAULT_TOPIC_NAMESPACE;
use guardian_core::types::{to_stored_precision, DbId};
use guardian_db::models::device::Device;
use guardian_db::models::reading::{CreateReading, Reading};
use guardian_events::{AlertData, LiveEvent, LiveHub};
use tokio::time::Instant;
use tracing::Span;

use crate::ports::{IngestStores, StoreError};
use crate::retry::{with_retry, RetryPolicy};
use crate::stats::IngestStats;

/// Tunables for [`IngestPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Expected first topic segment.
    pub topic_namespace: String,
    /// Retry policy for store writes and registry lookups.
    pub retry: RetryPolicy,
    /// Deadline for processing one message end to end.
    pub processing_timeout: Duration,
    /// Create devices for unseen external ids instead of dropping.
    pub auto_register_devices: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            topic_namespace: DEFAULT_TOPIC_NAMESPACE.to_string(),
            retry: RetryPolicy::default(),
            processing_timeout: Duration::from_secs(10),
            auto_register_devices: false,
        }
    }
}

/// Ingestion pipeline over a set of stores.
pub struct IngestPipeline<S> {
    stores: S,
    hub: Arc<LiveHub>,
    stats: Arc<IngestStats>,
    settings: PipelineSettings,
}

impl<S: IngestStores> IngestPipeline<S> {
    pub fn new(
        stores: S,
        hub: Arc<LiveHub>,
        stats: Arc<IngestStats>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            stores,
            hub,
            stats,
            settings,
        }
    }

    pub fn stores(&self) -> &S {
        &self.stores
    }

    pub fn stats(&self) -> &Arc<IngestStats> {
        &self.stats
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process one inbound message under the processing deadline.
    ///
    /// Logs and counts the outcome. Errors are returned for the caller's
    /// information only; none of them should stop the subscriber loop.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) -> Result<Reading, IngestError> {
        self.stats.record_received();
        let started = Instant::now();

        let result =
            match tokio::time::timeout(self.settings.processing_timeout, self.on_message(topic, payload))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(IngestError::Timeout {
                    elapsed_ms: started.elapsed().as_millis() as u64,
                }),
            };

        if let Err(e) = &result {
            self.stats.record_drop(e);
            match e {
                IngestError::MalformedTopic(_)
                | IngestError::MalformedPayload(_)
                | IngestError::UnknownDevice(_) => {
                    tracing::warn!(kind = e.kind(), error = %e, "Dropped telemetry message");
                }
                IngestError::StoreUnavailable(_) | IngestError::Timeout { .. } => {
                    tracing::error!(kind = e.kind(), error = %e, "Dropped telemetry message");
                }
            }
        }

        result
    }

    /// Process one inbound message without a deadline.
    ///
    /// Order of effects: reading append, alert rule load and evaluation,
    /// alert appends, then the `telemetry` event followed by one `alert`
    /// event per stored alert.
    pub async fn on_message(&self, topic: &str, payload: &[u8]) -> Result<Reading, IngestError> {
        let topic_device_id = parse_topic(topic, &self.settings.topic_namespace)?;
        let decoded = decode_payload(payload)?;
        Span::current().record("device_id", decoded.external_id.as_str());

        if decoded.external_id != topic_device_id {
            tracing::debug!(
                topic_device_id,
                payload_device_id = %decoded.external_id,
                "Topic and payload device ids differ, using payload",
            );
        }

        let device = self.resolve_device(&decoded.external_id).await?;

        let create = CreateReading {
            device_id: device.id,
            temp_c: decoded.temp_c,
            recorded_at: decoded.recorded_at,
            received_at: to_stored_precision(Utc::now()),
        };
        let reading_id = with_retry(&self.settings.retry, "append_reading", || {
            self.stores.append_reading(&create)
        })
        .await
        .map_err(store_unavailable)?;
        self.stats.record_persisted();

        let reading = Reading {
            id: reading_id,
            device_id: create.device_id,
            temp_c: create.temp_c,
            recorded_at: create.recorded_at,
            received_at: create.received_at,
        };
        tracing::debug!(
            reading_id,
            device_id = %device.device_id,
            temp_c = reading.temp_c,
            latency_ms = (reading.received_at - reading.recorded_at).num_milliseconds(),
            "Reading stored",
        );

        let alerts = self.evaluate_and_store(&reading).await;

        self.hub.publish(LiveEvent::telemetry(
            device.device_id.as_str(),
            reading.temp_c,
            reading.recorded_at,
        ));
        for (alert_id, alert) in alerts {
            self.hub.publish(LiveEvent::alert(
                device.device_id.as_str(),
                AlertData {
                    alert_id,
                    alert_type: alert.alert_type,
                    temp_c: alert.temp_c,
                    message: alert.message,
                },
            ));
        }

        Ok(reading)
    }

    /// Map an external id to an active device, registering it if allowed.
    async fn resolve_device(&self, external_id: &str) -> Result<Device, IngestError> {
        let found = with_retry(&self.settings.retry, "resolve_device", || {
            self.stores.resolve_device_id(external_id)
        })
        .await
        .map_err(store_unavailable)?;

        let device = match found {
            Some(device) => device,
            None if self.settings.auto_register_devices => {
                let device = with_retry(&self.settings.retry, "register_device", || {
                    self.stores.register_device(external_id)
                })
                .await
                .map_err(store_unavailable)?;
                tracing::info!(device_id = %external_id, id = device.id, "Auto-registered device");
                device
            }
            None => return Err(IngestError::UnknownDevice(external_id.to_string())),
        };

        if !device.is_active {
            tracing::debug!(device_id = %external_id, "Device is inactive");
            return Err(IngestError::UnknownDevice(external_id.to_string()));
        }
        Ok(device)
    }

    /// Evaluate the device's active rules and store every resulting alert.
    ///
    /// Returns the alerts that were stored, with their ids. Failures are
    /// logged and counted, never propagated.
    async fn evaluate_and_store(&self, reading: &Reading) -> Vec<(DbId, NewAlert)> {
        let rules = match self.stores.active_rules_for(reading.device_id).await {
            Ok(rules) => rules,
            Err(e) => {
                self.stats.record_rule_failure();
                tracing::error!(
                    reading_id = reading.id,
                    error = %e,
                    "Rule evaluation failed: could not load alert rules",
                );
                return Vec::new();
            }
        };

        let snapshot = ReadingSnapshot {
            device_id: reading.device_id,
            temp_c: reading.temp_c,
            received_at: reading.received_at,
        };

        let mut stored = Vec::new();
        for alert in evaluate(snapshot, &rules) {
            match with_retry(&self.settings.retry, "append_alert", || {
                self.stores.append_alert(&alert)
            })
            .await
            {
                Ok(alert_id) => {
                    self.stats.record_alert_created();
                    tracing::info!(
                        alert_id,
                        rule_id = alert.rule_id,
                        alert_type = alert.alert_type.as_str(),
                        temp_c = alert.temp_c,
                        "Alert triggered",
                    );
                    stored.push((alert_id, alert));
                }
                Err(e) => {
                    self.stats.record_alert_failure();
                    tracing::error!(
                        reading_id = reading.id,
                        rule_id = alert.rule_id,
                        error = %e,
                        "Failed to store alert",
                    );
                }
            }
        }
        stored
    }
}

fn store_unavailable(e: StoreError) -> IngestError {
    IngestError::StoreUnavailable(e.to_string())
}
