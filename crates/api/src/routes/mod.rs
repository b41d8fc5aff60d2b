pub mod alerts;
pub mod devices;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws/{device_id}                              live stream (WebSocket), "all" for every device
///
/// /devices/{id}/telemetry                      reading history (GET)
/// /devices/{id}/rules                          list, create (GET, POST)
/// /devices/{id}/rules/{rule_id}                delete (DELETE)
/// /devices/{id}/alerts                         alerts of one device (GET)
///
/// /alerts                                      list (GET)
/// /alerts/{id}                                 get (GET)
/// /alerts/{id}/acknowledge                     acknowledge one (PATCH)
/// /alerts/acknowledge-all                      acknowledge pending (PATCH)
/// /alerts/clear-acknowledged                   delete acknowledged (DELETE)
/// /alerts/delete-all                           delete every alert (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/{device_id}", get(ws::ws_handler))
        .nest("/devices", devices::router())
        .nest("/alerts", alerts::router())
}
