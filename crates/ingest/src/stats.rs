//! Ingestion counters.
//!
//! Lock-free totals updated from concurrent message tasks and exposed on
//! the health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use guardian_core::telemetry::IngestError;
use serde::Serialize;

/// Running totals since process start.
#[derive(Debug, Default)]
pub struct IngestStats {
    received: AtomicU64,
    persisted: AtomicU64,
    alerts_created: AtomicU64,
    alert_failures: AtomicU64,
    rule_failures: AtomicU64,
    dropped_malformed_topic: AtomicU64,
    dropped_malformed_payload: AtomicU64,
    dropped_unknown_device: AtomicU64,
    dropped_store_unavailable: AtomicU64,
    timed_out: AtomicU64,
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStatsSnapshot {
    pub received: u64,
    pub persisted: u64,
    pub alerts_created: u64,
    pub alert_failures: u64,
    pub rule_failures: u64,
    pub dropped_malformed_topic: u64,
    pub dropped_malformed_payload: u64,
    pub dropped_unknown_device: u64,
    pub dropped_store_unavailable: u64,
    pub timed_out: u64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert_created(&self) {
        self.alerts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert_failure(&self) {
        self.alert_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rule_failure(&self) {
        self.rule_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a dropped message under its error kind.
    pub fn record_drop(&self, error: &IngestError) {
        let counter = match error {
            IngestError::MalformedTopic(_) => &self.dropped_malformed_topic,
            IngestError::MalformedPayload(_) => &self.dropped_malformed_payload,
            IngestError::UnknownDevice(_) => &self.dropped_unknown_device,
            IngestError::StoreUnavailable(_) => &self.dropped_store_unavailable,
            IngestError::Timeout { .. } => &self.timed_out,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IngestStatsSnapshot {
        IngestStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            alerts_created: self.alerts_created.load(Ordering::Relaxed),
            alert_failures: self.alert_failures.load(Ordering::Relaxed),
            rule_failures: self.rule_failures.load(Ordering::Relaxed),
            dropped_malformed_topic: self.dropped_malformed_topic.load(Ordering::Relaxed),
            dropped_malformed_payload: self.dropped_malformed_payload.load(Ordering::Relaxed),
            dropped_unknown_device: self.dropped_unknown_device.load(Ordering::Relaxed),
            dropped_store_unavailable: self.dropped_store_unavailable.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_are_counted_per_kind() {
        let stats = IngestStats::new();
        stats.record_drop(&IngestError::MalformedPayload("x".into()));
        stats.record_drop(&IngestError::MalformedPayload("y".into()));
        stats.record_drop(&IngestError::Timeout { elapsed_ms: 10 });

        let snap = stats.snapshot();
        assert_eq!(snap.dropped_malformed_payload, 2);
        assert_eq!(snap.timed_out, 1);
        assert_eq!(snap.dropped_unknown_device, 0);
    }
}
