#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use guardian_core::alert::{AlertType, NewAlert};
use guardian_core::types::DbId;
use guardian_db::models::alert_rule::CreateAlertRule;
use guardian_db::models::device::CreateDevice;
use guardian_db::models::reading::CreateReading;
use guardian_db::repositories::{AlertRepo, AlertRuleRepo, DeviceRepo, ReadingRepo};
use guardian_events::LiveHub;
use guardian_ingest::IngestStats;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use guardian_api::config::{LogFormat, ServerConfig};
use guardian_api::router::build_app_router;
use guardian_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        log_format: LogFormat::Pretty,
        reading_retention_days: None,
    }
}

/// Build the full application router over `pool` with a fresh hub.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_hub(pool, Arc::new(LiveHub::default()))
}

/// Build the full application router sharing `hub` with the caller.
pub fn build_test_app_with_hub(pool: PgPool, hub: Arc<LiveHub>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        hub,
        ingest_stats: Arc::new(IngestStats::new()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn seed_device(pool: &PgPool, external_id: &str) -> DbId {
    DeviceRepo::create(
        pool,
        &CreateDevice {
            device_id: external_id.to_string(),
            name: format!("Pod {external_id}"),
            description: None,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_rule(pool: &PgPool, device_id: DbId, temp_min: f64, temp_max: f64) -> DbId {
    AlertRuleRepo::create(pool, device_id, &CreateAlertRule { temp_min, temp_max })
        .await
        .unwrap()
        .id
}

pub async fn seed_alert(pool: &PgPool, device_id: DbId, rule_id: DbId, minutes_ago: i64) -> DbId {
    let alert = NewAlert {
        device_id,
        rule_id,
        temp_c: 40.2,
        alert_type: AlertType::High,
        message: "HIGH temperature: 40.2°C (threshold: 39)".to_string(),
        triggered_at: Utc::now() - Duration::minutes(minutes_ago),
    };
    AlertRepo::insert(pool, &alert).await.unwrap()
}

pub async fn seed_reading(pool: &PgPool, device_id: DbId, temp_c: f64, minutes_ago: i64) -> DbId {
    let recorded_at = Utc::now() - Duration::minutes(minutes_ago);
    ReadingRepo::insert(
        pool,
        &CreateReading {
            device_id,
            temp_c,
            recorded_at,
            received_at: recorded_at,
        },
    )
    .await
    .unwrap()
}
