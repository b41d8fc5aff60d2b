//! Device-scoped routes: history, rules and alerts.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{alerts, rules, telemetry};
use crate::state::AppState;

/// Routes mounted at `/devices`.
///
/// ```text
/// GET    /{id}/telemetry            -> get_device_telemetry
/// GET    /{id}/rules                -> list_device_rules
/// POST   /{id}/rules                -> create_device_rule
/// DELETE /{id}/rules/{rule_id}      -> delete_device_rule
/// GET    /{id}/alerts               -> list_device_alerts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/telemetry", get(telemetry::get_device_telemetry))
        .route(
            "/{id}/rules",
            get(rules::list_device_rules).post(rules::create_device_rule),
        )
        .route("/{id}/rules/{rule_id}", delete(rules::delete_device_rule))
        .route("/{id}/alerts", get(alerts::list_device_alerts))
}
