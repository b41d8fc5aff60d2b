//! Handlers for alert listing and management.
//!
//! Bulk operations each run as one SQL statement: they either apply to the
//! whole snapshot and report its size, or fail with no effect.

use axum::extract::{Path, Query, State};
use axum::Json;
use guardian_core::error::CoreError;
use guardian_core::types::DbId;
use guardian_db::models::alert::{Alert, AlertFilter};
use guardian_db::repositories::AlertRepo;

use crate::error::AppResult;
use crate::handlers::find_device;
use crate::query::{
    clamp_alert_limit, AcknowledgeAllParams, AlertListParams, LimitParams, DEFAULT_ALERT_LIMIT,
    DEFAULT_DEVICE_ALERT_LIMIT,
};
use crate::response::{AcknowledgedCount, DataResponse, DeletedCount};
use crate::state::AppState;

/// GET /alerts?limit=&unacknowledged_only=
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertListParams>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let filter = AlertFilter {
        unacknowledged_only: params.unacknowledged_only,
        device_id: None,
        limit: clamp_alert_limit(params.limit, DEFAULT_ALERT_LIMIT),
    };
    let alerts = AlertRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /devices/{id}/alerts?limit=
pub async fn list_device_alerts(
    State(state): State<AppState>,
    Path(device_id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let device = find_device(&state.pool, device_id).await?;
    let filter = AlertFilter {
        unacknowledged_only: false,
        device_id: Some(device.id),
        limit: clamp_alert_limit(params.limit, DEFAULT_DEVICE_ALERT_LIMIT),
    };
    let alerts = AlertRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /alerts/{id}
pub async fn get_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = AlertRepo::find_by_id(&state.pool, alert_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Alert",
            id: alert_id,
        })?;
    Ok(Json(DataResponse { data: alert }))
}

/// PATCH /alerts/{id}/acknowledge
///
/// Idempotent: acknowledging twice returns the alert with its original
/// `acknowledged_at`.
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = AlertRepo::acknowledge(&state.pool, alert_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Alert",
            id: alert_id,
        })?;
    Ok(Json(DataResponse { data: alert }))
}

/// PATCH /alerts/acknowledge-all?device_id=
pub async fn acknowledge_all_alerts(
    State(state): State<AppState>,
    Query(params): Query<AcknowledgeAllParams>,
) -> AppResult<Json<DataResponse<AcknowledgedCount>>> {
    let acknowledged = AlertRepo::acknowledge_all(&state.pool, params.device_id).await?;
    tracing::info!(acknowledged, device_id = ?params.device_id, "Acknowledged alerts");
    Ok(Json(DataResponse {
        data: AcknowledgedCount { acknowledged },
    }))
}

/// DELETE /alerts/clear-acknowledged
pub async fn clear_acknowledged_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DeletedCount>>> {
    let deleted = AlertRepo::clear_acknowledged(&state.pool).await?;
    tracing::info!(deleted, "Cleared acknowledged alerts");
    Ok(Json(DataResponse {
        data: DeletedCount { deleted },
    }))
}

/// DELETE /alerts/delete-all
pub async fn delete_all_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DeletedCount>>> {
    let deleted = AlertRepo::delete_all(&state.pool).await?;
    tracing::warn!(deleted, "Deleted all alerts");
    Ok(Json(DataResponse {
        data: DeletedCount { deleted },
    }))
}
