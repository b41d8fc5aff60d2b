use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /                      -> list_alerts
/// GET    /{id}                  -> get_alert
/// PATCH  /{id}/acknowledge      -> acknowledge_alert
/// PATCH  /acknowledge-all       -> acknowledge_all_alerts
/// DELETE /clear-acknowledged    -> clear_acknowledged_alerts
/// DELETE /delete-all            -> delete_all_alerts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts))
        .route("/acknowledge-all", patch(alerts::acknowledge_all_alerts))
        .route(
            "/clear-acknowledged",
            delete(alerts::clear_acknowledged_alerts),
        )
        .route("/delete-all", delete(alerts::delete_all_alerts))
        .route("/{id}", get(alerts::get_alert))
        .route("/{id}/acknowledge", patch(alerts::acknowledge_alert))
}
