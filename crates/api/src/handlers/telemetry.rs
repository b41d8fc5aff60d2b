//! Handlers for reading history.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use guardian_core::types::DbId;
use guardian_db::models::reading::Reading;
use guardian_db::repositories::ReadingRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::find_device;
use crate::query::{
    TelemetryParams, DEFAULT_TELEMETRY_HOURS, DEFAULT_TELEMETRY_LIMIT, MAX_TELEMETRY_HOURS,
    MAX_TELEMETRY_LIMIT,
};
use crate::response::DataResponse;
use crate::state::AppState;

/// Reading history of one device.
#[derive(Debug, Serialize)]
pub struct TelemetryHistory {
    /// External device id.
    pub device_id: String,
    pub device_name: String,
    /// Ascending by `recorded_at`.
    pub readings: Vec<Reading>,
    pub count: usize,
}

/// GET /devices/{id}/telemetry?hours=&limit=
///
/// Readings recorded in the last `hours` hours. When the window holds more
/// than `limit` readings the most recent ones are returned. Without the cap
/// this is `ReadingStore::query_readings` over the same window.
pub async fn get_device_telemetry(
    State(state): State<AppState>,
    Path(device_id): Path<DbId>,
    Query(params): Query<TelemetryParams>,
) -> AppResult<Json<DataResponse<TelemetryHistory>>> {
    let hours = params.hours.unwrap_or(DEFAULT_TELEMETRY_HOURS);
    if !(1..=MAX_TELEMETRY_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {MAX_TELEMETRY_HOURS}"
        )));
    }
    let limit = params.limit.unwrap_or(DEFAULT_TELEMETRY_LIMIT);
    if !(1..=MAX_TELEMETRY_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_TELEMETRY_LIMIT}"
        )));
    }

    let device = find_device(&state.pool, device_id).await?;
    let since = Utc::now() - Duration::hours(hours);
    let readings = ReadingRepo::list_recent_since(&state.pool, device.id, since, limit).await?;

    Ok(Json(DataResponse {
        data: TelemetryHistory {
            device_id: device.device_id,
            device_name: device.name,
            count: readings.len(),
            readings,
        },
    }))
}
