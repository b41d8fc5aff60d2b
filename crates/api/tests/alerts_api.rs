//! Integration tests for `/api/v1/alerts` and device alert listings.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch, seed_alert, seed_device, seed_rule};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_alerts_is_newest_first(pool: PgPool) {
    let device = seed_device(&pool, "pod-1").await;
    let rule = seed_rule(&pool, device, 35.0, 39.0).await;
    let old = seed_alert(&pool, device, rule, 10).await;
    let new = seed_alert(&pool, device, rule, 1).await;

    let response = get(common::build_test_app(pool), "/api/v1/alerts").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![new, old]);
    assert_eq!(json["data"][0]["alert_type"], "high");
    assert_eq!(json["data"][0]["is_acknowledged"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_alerts_filters_unacknowledged_and_limits(pool: PgPool) {
    let device = seed_device(&pool, "pod-1").await;
    let rule = seed_rule(&pool, device, 35.0, 39.0).await;
    let acked = seed_alert(&pool, device, rule, 5).await;
    for minutes in 1..4 {
        seed_alert(&pool, device, rule, minutes).await;
    }
    patch(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/alerts/{acked}/acknowledge"),
    )
    .await;

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/alerts?unacknowledged_only=true",
    )
    .await;
    let pending = body_json(response).await;
    assert_eq!(pending["data"].as_array().unwrap().len(), 3);

    let response = get(common::build_test_app(pool), "/api/v1/alerts?limit=2").await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_unknown_alert_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/alerts/424242").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledge_is_idempotent(pool: PgPool) {
    let device = seed_device(&pool, "pod-1").await;
    let rule = seed_rule(&pool, device, 35.0, 39.0).await;
    let alert = seed_alert(&pool, device, rule, 1).await;
    let uri = format!("/api/v1/alerts/{alert}/acknowledge");

    let first = body_json(patch(common::build_test_app(pool.clone()), &uri).await).await;
    assert_eq!(first["data"]["is_acknowledged"], true);
    assert!(first["data"]["acknowledged_at"].is_string());

    let response = patch(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_eq!(second["data"]["acknowledged_at"], first["data"]["acknowledged_at"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledge_unknown_alert_returns_404(pool: PgPool) {
    let response = patch(
        common::build_test_app(pool),
        "/api/v1/alerts/424242/acknowledge",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledge_all_reports_count(pool: PgPool) {
    let device = seed_device(&pool, "pod-1").await;
    let rule = seed_rule(&pool, device, 35.0, 39.0).await;
    for minutes in 0..5 {
        seed_alert(&pool, device, rule, minutes).await;
    }

    let response = patch(
        common::build_test_app(pool.clone()),
        "/api/v1/alerts/acknowledge-all",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["acknowledged"], 5);

    let response = patch(common::build_test_app(pool), "/api/v1/alerts/acknowledge-all").await;
    assert_eq!(body_json(response).await["data"]["acknowledged"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledge_all_can_be_scoped_to_a_device(pool: PgPool) {
    let a = seed_device(&pool, "pod-a").await;
    let b = seed_device(&pool, "pod-b").await;
    let rule_a = seed_rule(&pool, a, 35.0, 39.0).await;
    let rule_b = seed_rule(&pool, b, 35.0, 39.0).await;
    seed_alert(&pool, a, rule_a, 1).await;
    seed_alert(&pool, b, rule_b, 1).await;

    let response = patch(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/alerts/acknowledge-all?device_id={a}"),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["acknowledged"], 1);

    let response = get(
        common::build_test_app(pool),
        "/api/v1/alerts?unacknowledged_only=true",
    )
    .await;
    let pending = body_json(response).await;
    assert_eq!(pending["data"].as_array().unwrap().len(), 1);
    assert_eq!(pending["data"][0]["device_id"], b);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clear_acknowledged_then_delete_all(pool: PgPool) {
    let device = seed_device(&pool, "pod-1").await;
    let rule = seed_rule(&pool, device, 35.0, 39.0).await;
    let acked = seed_alert(&pool, device, rule, 2).await;
    seed_alert(&pool, device, rule, 1).await;
    patch(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/alerts/{acked}/acknowledge"),
    )
    .await;

    let response = delete(
        common::build_test_app(pool.clone()),
        "/api/v1/alerts/clear-acknowledged",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 1);

    let response = delete(common::build_test_app(pool.clone()), "/api/v1/alerts/delete-all").await;
    assert_eq!(body_json(response).await["data"]["deleted"], 1);

    let response = get(common::build_test_app(pool), "/api/v1/alerts").await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn device_alerts_are_scoped_and_404_for_unknown_device(pool: PgPool) {
    let a = seed_device(&pool, "pod-a").await;
    let b = seed_device(&pool, "pod-b").await;
    let rule_a = seed_rule(&pool, a, 35.0, 39.0).await;
    let rule_b = seed_rule(&pool, b, 35.0, 39.0).await;
    let mine = seed_alert(&pool, a, rule_a, 1).await;
    seed_alert(&pool, b, rule_b, 1).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/devices/{a}/alerts"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], mine);

    let response = get(common::build_test_app(pool), "/api/v1/devices/9999/alerts").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
