use std::sync::Arc;

use guardian_events::LiveHub;
use guardian_ingest::IngestStats;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: guardian_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live broadcast hub shared with the ingestion pipeline.
    pub hub: Arc<LiveHub>,
    /// Ingestion counters, reported by `/health`.
    pub ingest_stats: Arc<IngestStats>,
}
