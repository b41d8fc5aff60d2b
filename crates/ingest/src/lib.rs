//! Device telemetry ingestion.
//!
//! - [`config`]: broker and pipeline settings from the environment.
//! - [`ports`]: the store and registry seams the pipeline writes through.
//! - [`pipeline`]: decode, persist, evaluate, persist alerts, broadcast.
//! - [`pg`]: PostgreSQL implementations of the ports.
//! - [`mqtt`]: broker subscription loop with reconnect and bounded
//!   concurrency.
//! - [`stats`]: ingestion counters.

pub mod config;
pub mod mqtt;
pub mod pg;
pub mod pipeline;
pub mod ports;
pub mod retry;
pub mod stats;

pub use config::IngestConfig;
pub use pg::PgStores;
pub use pipeline::{IngestPipeline, PipelineSettings};
pub use ports::{AlertStore, DeviceRegistry, ReadingStore, StoreError};
pub use stats::{IngestStats, IngestStatsSnapshot};
