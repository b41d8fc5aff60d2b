//! Handlers for per-device alert rules.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use guardian_core::error::CoreError;
use guardian_core::threshold_validation::validate_rule_bounds;
use guardian_core::types::DbId;
use guardian_db::models::alert_rule::{AlertRule, CreateAlertRule};
use guardian_db::repositories::AlertRuleRepo;

use crate::error::AppResult;
use crate::handlers::find_device;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /devices/{id}/rules
pub async fn list_device_rules(
    State(state): State<AppState>,
    Path(device_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AlertRule>>>> {
    let device = find_device(&state.pool, device_id).await?;
    let rules = AlertRuleRepo::list_for_device(&state.pool, device.id).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /devices/{id}/rules
///
/// Rejects bands where `temp_min >= temp_max` with 400.
pub async fn create_device_rule(
    State(state): State<AppState>,
    Path(device_id): Path<DbId>,
    Json(input): Json<CreateAlertRule>,
) -> AppResult<(StatusCode, Json<DataResponse<AlertRule>>)> {
    validate_rule_bounds(input.temp_min, input.temp_max)?;
    let device = find_device(&state.pool, device_id).await?;

    let rule = AlertRuleRepo::create(&state.pool, device.id, &input).await?;
    tracing::info!(
        device_id = device.id,
        rule_id = rule.id,
        temp_min = rule.temp_min,
        temp_max = rule.temp_max,
        "Alert rule created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// DELETE /devices/{id}/rules/{rule_id}
pub async fn delete_device_rule(
    State(state): State<AppState>,
    Path((device_id, rule_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let device = find_device(&state.pool, device_id).await?;
    if !AlertRuleRepo::delete(&state.pool, device.id, rule_id).await? {
        return Err(CoreError::NotFound {
            entity: "AlertRule",
            id: rule_id,
        }
        .into());
    }
    tracing::info!(device_id = device.id, rule_id, "Alert rule deleted");
    Ok(StatusCode::NO_CONTENT)
}
