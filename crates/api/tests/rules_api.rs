//! Integration tests for `/api/v1/devices/{id}/rules`.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, seed_alert, seed_device, seed_rule};
use guardian_db::repositories::AlertRepo;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rule_returns_201_and_lists_it(pool: PgPool) {
    let device = seed_device(&pool, "pod-1").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/devices/{device}/rules"),
        json!({ "temp_min": 35.0, "temp_max": 39.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["device_id"], device);
    assert_eq!(created["data"]["temp_max"], 39.0);
    assert_eq!(created["data"]["is_active"], true);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/devices/{device}/rules"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["id"], created["data"]["id"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inverted_band_is_rejected(pool: PgPool) {
    let device = seed_device(&pool, "pod-1").await;

    for body in [
        json!({ "temp_min": 39.0, "temp_max": 35.0 }),
        json!({ "temp_min": 37.0, "temp_max": 37.0 }),
    ] {
        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/devices/{device}/rules"),
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/devices/{device}/rules"),
    )
    .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rules_of_unknown_device_return_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/devices/9999/rules").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Device with id 9999 not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_rule_keeps_its_alerts(pool: PgPool) {
    let device = seed_device(&pool, "pod-1").await;
    let rule = seed_rule(&pool, device, 35.0, 39.0).await;
    let alert = seed_alert(&pool, device, rule, 1).await;

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/devices/{device}/rules/{rule}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let kept = AlertRepo::find_by_id(&pool, alert).await.unwrap().unwrap();
    assert_eq!(kept.rule_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_rule_of_another_device_returns_404(pool: PgPool) {
    let owner = seed_device(&pool, "pod-1").await;
    let other = seed_device(&pool, "pod-2").await;
    let rule = seed_rule(&pool, owner, 35.0, 39.0).await;

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/devices/{other}/rules/{rule}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/devices/{owner}/rules"),
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}
