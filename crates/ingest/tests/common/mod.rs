//! In-memory implementations of the ingestion ports.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use guardian_core::alert::{NewAlert, RuleBounds};
use guardian_core::types::{DbId, Timestamp};
use guardian_db::models::device::Device;
use guardian_db::models::reading::{CreateReading, Reading};
use guardian_events::LiveHub;
use guardian_ingest::ports::{auto_registered_name, AlertStore, DeviceRegistry, ReadingStore};
use guardian_ingest::retry::RetryPolicy;
use guardian_ingest::{IngestPipeline, IngestStats, PipelineSettings, StoreError};

#[derive(Default)]
struct Inner {
    devices: Mutex<Vec<Device>>,
    rules: Mutex<Vec<RuleBounds>>,
    readings: Mutex<Vec<Reading>>,
    alerts: Mutex<Vec<(DbId, NewAlert)>>,
    /// Reading appends that fail transiently before one succeeds.
    reading_outages: AtomicU32,
    reject_readings: AtomicBool,
    reject_alerts: AtomicBool,
    fail_rules: AtomicBool,
    rule_delay: Mutex<Option<Duration>>,
    reading_attempts: AtomicU32,
}

/// Shared, cloneable in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStores {
    inner: Arc<Inner>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&self, external_id: &str) -> DbId {
        let mut devices = self.inner.devices.lock().unwrap();
        let id = devices.len() as DbId + 1;
        devices.push(device(id, external_id, external_id, true));
        id
    }

    pub fn add_inactive_device(&self, external_id: &str) -> DbId {
        let mut devices = self.inner.devices.lock().unwrap();
        let id = devices.len() as DbId + 1;
        devices.push(device(id, external_id, external_id, false));
        id
    }

    pub fn add_rule(&self, device_id: DbId, temp_min: f64, temp_max: f64) -> DbId {
        let mut rules = self.inner.rules.lock().unwrap();
        let rule_id = rules.len() as DbId + 1;
        rules.push(RuleBounds {
            rule_id,
            device_id,
            temp_min,
            temp_max,
            is_active: true,
        });
        rule_id
    }

    pub fn devices(&self) -> Vec<Device> {
        self.inner.devices.lock().unwrap().clone()
    }

    pub fn readings(&self) -> Vec<Reading> {
        self.inner.readings.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<(DbId, NewAlert)> {
        self.inner.alerts.lock().unwrap().clone()
    }

    pub fn reading_attempts(&self) -> u32 {
        self.inner.reading_attempts.load(Ordering::SeqCst)
    }

    pub fn fail_next_reading_appends(&self, count: u32) {
        self.inner.reading_outages.store(count, Ordering::SeqCst);
    }

    pub fn reject_readings(&self) {
        self.inner.reject_readings.store(true, Ordering::SeqCst);
    }

    pub fn reject_alerts(&self) {
        self.inner.reject_alerts.store(true, Ordering::SeqCst);
    }

    pub fn fail_rule_lookups(&self) {
        self.inner.fail_rules.store(true, Ordering::SeqCst);
    }

    pub fn delay_rule_lookups(&self, delay: Duration) {
        *self.inner.rule_delay.lock().unwrap() = Some(delay);
    }
}

fn device(id: DbId, external_id: &str, name: &str, is_active: bool) -> Device {
    let now = Utc::now();
    Device {
        id,
        device_id: external_id.to_string(),
        name: name.to_string(),
        description: None,
        is_active,
        created_at: now,
        updated_at: now,
    }
}

impl ReadingStore for MemoryStores {
    async fn append_reading(&self, reading: &CreateReading) -> Result<DbId, StoreError> {
        self.inner.reading_attempts.fetch_add(1, Ordering::SeqCst);
        if self.inner.reject_readings.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("readings are read-only".into()));
        }
        let outage = self
            .inner
            .reading_outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if outage.is_ok() {
            return Err(StoreError::Unavailable("connection reset".into()));
        }

        let mut readings = self.inner.readings.lock().unwrap();
        let id = readings.len() as DbId + 1;
        readings.push(Reading {
            id,
            device_id: reading.device_id,
            temp_c: reading.temp_c,
            recorded_at: reading.recorded_at,
            received_at: reading.received_at,
        });
        Ok(id)
    }

    async fn query_readings(
        &self,
        device_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<Reading>, StoreError> {
        let mut rows: Vec<Reading> = self
            .inner
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.device_id == device_id && r.recorded_at >= since)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.recorded_at, r.id));
        Ok(rows)
    }
}

impl AlertStore for MemoryStores {
    async fn append_alert(&self, alert: &NewAlert) -> Result<DbId, StoreError> {
        if self.inner.reject_alerts.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("alerts are read-only".into()));
        }
        let mut alerts = self.inner.alerts.lock().unwrap();
        let id = alerts.len() as DbId + 1;
        alerts.push((id, alert.clone()));
        Ok(id)
    }
}

impl DeviceRegistry for MemoryStores {
    async fn resolve_device_id(&self, external_id: &str) -> Result<Option<Device>, StoreError> {
        Ok(self
            .inner
            .devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.device_id == external_id)
            .cloned())
    }

    async fn active_rules_for(&self, device_id: DbId) -> Result<Vec<RuleBounds>, StoreError> {
        let delay = *self.inner.rule_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.inner.fail_rules.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("registry offline".into()));
        }
        Ok(self
            .inner
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.device_id == device_id && r.is_active)
            .cloned()
            .collect())
    }

    async fn register_device(&self, external_id: &str) -> Result<Device, StoreError> {
        let mut devices = self.inner.devices.lock().unwrap();
        if let Some(existing) = devices.iter().find(|d| d.device_id == external_id) {
            return Ok(existing.clone());
        }
        let id = devices.len() as DbId + 1;
        let created = device(id, external_id, &auto_registered_name(external_id), true);
        devices.push(created.clone());
        Ok(created)
    }
}

/// Settings with fast retries for tests.
pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        retry: RetryPolicy {
            attempts: 3,
            base_delay: Duration::from_millis(1),
        },
        ..PipelineSettings::default()
    }
}

/// Build a pipeline over `stores` with a fresh hub and counters.
pub fn build_pipeline(
    stores: MemoryStores,
    settings: PipelineSettings,
) -> (IngestPipeline<MemoryStores>, Arc<LiveHub>) {
    let hub = Arc::new(LiveHub::default());
    let pipeline = IngestPipeline::new(
        stores,
        Arc::clone(&hub),
        Arc::new(IngestStats::new()),
        settings,
    );
    (pipeline, hub)
}

/// A well-formed payload for `device_id`.
pub fn payload(device_id: &str, temp_c: f64) -> Vec<u8> {
    format!(r#"{{"device_id":"{device_id}","ts":"2025-01-01T00:00:12.000Z","temp_c":{temp_c}}}"#)
        .into_bytes()
}

pub fn topic(device_id: &str) -> String {
    format!("egg/{device_id}/telemetry")
}
