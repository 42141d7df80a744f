//! Sensor ingestion and the alert lifecycle over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    get_request_with_auth, json_request_with_auth, parse_response_body, seed_admin, seed_tenant,
    sensor_request, TestApp, TEST_INGEST_KEY,
};
use domain::models::{AlertStatus, AlertType, AuditAction};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_sensor_data_requires_ingest_key() {
    let app = TestApp::new();
    let tenant = seed_tenant(&app.store, "Acme");

    let response = app
        .router()
        .oneshot(sensor_request(
            json!({ "deviceId": tenant.device.id, "temperature": 4.0 }),
            "wrong-key",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_breaching_reading_raises_one_alert() {
    let app = TestApp::new();
    let tenant = seed_tenant(&app.store, "Acme");

    let response = app
        .router()
        .oneshot(sensor_request(
            json!({ "deviceId": tenant.device.id, "temperature": 12.5, "humidity": 50.0 }),
            TEST_INGEST_KEY,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    let created = body["created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["alertType"], "temperature");
    assert_eq!(created[0]["status"], "active");

    // Still breaching: deduplicated against the unresolved alert.
    let response = app
        .router()
        .oneshot(sensor_request(
            json!({ "deviceId": tenant.device.id, "temperature": 13.0 }),
            TEST_INGEST_KEY,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert!(body["created"].as_array().unwrap().is_empty());
    assert_eq!(app.store.alerts().len(), 1);

    let created_entries = app
        .store
        .audit_entries()
        .into_iter()
        .filter(|e| e.action == AuditAction::AlertCreated)
        .count();
    assert_eq!(created_entries, 1);
}

#[tokio::test]
async fn test_recovery_resolves_alert() {
    let app = TestApp::new();
    let tenant = seed_tenant(&app.store, "Acme");

    for temperature in [12.5, 5.0] {
        let response = app
            .router()
            .oneshot(sensor_request(
                json!({ "deviceId": tenant.device.id, "temperature": temperature }),
                TEST_INGEST_KEY,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let alerts = app.store.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].status, AlertStatus::Resolved);
    assert!(alerts[0].resolved_at.is_some());
}

#[tokio::test]
async fn test_reading_for_unknown_device_is_not_found() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(sensor_request(
            json!({ "deviceId": 999_999, "temperature": 4.0 }),
            TEST_INGEST_KEY,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_snooze_hides_alert_from_active_view() {
    let app = TestApp::new();
    let tenant = seed_tenant(&app.store, "Acme");
    let alert = app.store.seed_alert(&tenant.device, AlertType::Temperature);
    let token = app.token_for(&tenant.employee);

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/alerts/snooze",
            json!({ "alertId": alert.id }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["alert"]["status"], "snoozed");

    let response = app
        .router()
        .oneshot(get_request_with_auth("/api/v1/alerts", &token))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert!(body["alerts"].as_array().unwrap().is_empty());

    let response = app
        .router()
        .oneshot(get_request_with_auth("/api/v1/alerts?view=all", &token))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["alerts"].as_array().unwrap().len(), 1);

    let entry = app.store.audit_entries().pop().unwrap();
    assert_eq!(entry.action, AuditAction::AlertSnoozed);
    assert_eq!(entry.actor_profile_id, Some(tenant.employee.id));
}

#[tokio::test]
async fn test_snooze_validation() {
    let app = TestApp::new();
    let tenant = seed_tenant(&app.store, "Acme");
    let alert = app.store.seed_alert(&tenant.device, AlertType::Humidity);
    let token = app.token_for(&tenant.manager);

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/alerts/snooze",
            json!({}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/alerts/snooze",
            json!({ "alertId": alert.id, "durationMinutes": 100_000 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Too large to be a duration at all; must not take the handler down.
    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/alerts/snooze",
            json!({ "alertId": alert.id, "durationMinutes": 200_000_000_000_000i64 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.alerts()[0].status, AlertStatus::Active);

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/alerts/snooze",
            json!({ "alertId": 424_242 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cross_company_snooze_refused() {
    let app = TestApp::new();
    let acme = seed_tenant(&app.store, "Acme");
    let globex = seed_tenant(&app.store, "Globex");
    let alert = app.store.seed_alert(&globex.device, AlertType::Temperature);

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/alerts/snooze",
            json!({ "alertId": alert.id }),
            &app.token_for(&acme.manager),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.store.alerts()[0].status, AlertStatus::Active);
}

#[tokio::test]
async fn test_resolve_is_terminal() {
    let app = TestApp::new();
    let tenant = seed_tenant(&app.store, "Acme");
    let alert = app.store.seed_alert(&tenant.device, AlertType::Temperature);
    let admin = seed_admin(&app.store);
    let uri = format!("/api/v1/alerts/{}/resolve", alert.id);

    // Employees cannot resolve.
    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            &uri,
            json!({}),
            &app.token_for(&tenant.employee),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            &uri,
            json!({}),
            &app.token_for(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["alert"]["status"], "resolved");

    // Snoozing a resolved alert is a validation error.
    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/alerts/snooze",
            json!({ "alertId": alert.id }),
            &app.token_for(&tenant.manager),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
