//! Service tickets over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    get_request_with_auth, json_request_with_auth, parse_response_body, seed_tenant, TestApp,
};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_employee_opens_ticket_and_manager_progresses_it() {
    let app = TestApp::new();
    let tenant = seed_tenant(&app.store, "Acme");

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "locationId": tenant.location.id,
                "deviceId": tenant.device.id,
                "problem": "Door seal torn",
                "visitDate": "2026-11-02"
            }),
            &app.token_for(&tenant.employee),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["ticket"]["status"], "open");
    let ticket_id = body["ticket"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/tickets/{}", ticket_id);
    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::PATCH,
            &uri,
            json!({ "status": "in_progress" }),
            &app.token_for(&tenant.employee),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::PATCH,
            &uri,
            json!({ "status": "in_progress" }),
            &app.token_for(&tenant.manager),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["ticket"]["status"], "in_progress");
}

#[tokio::test]
async fn test_ticket_requires_all_fields() {
    let app = TestApp::new();
    let tenant = seed_tenant(&app.store, "Acme");

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/tickets",
            json!({ "locationId": tenant.location.id, "problem": "Noisy fan" }),
            &app.token_for(&tenant.employee),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ticket_listing_is_scoped() {
    let app = TestApp::new();
    let acme = seed_tenant(&app.store, "Acme");
    let globex = seed_tenant(&app.store, "Globex");

    let response = app
        .router()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/tickets",
            json!({
                "locationId": globex.location.id,
                "deviceId": globex.device.id,
                "problem": "Compressor noise",
                "visitDate": "2026-11-03"
            }),
            &app.token_for(&globex.manager),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router()
        .oneshot(get_request_with_auth(
            "/api/v1/tickets",
            &app.token_for(&acme.manager),
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert!(body["tickets"].as_array().unwrap().is_empty());

    let response = app
        .router()
        .oneshot(get_request_with_auth(
            "/api/v1/tickets",
            &app.token_for(&globex.employee),
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["tickets"].as_array().unwrap().len(), 1);
}
