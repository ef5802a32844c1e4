mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{seeded_directory, InMemoryDirectory, TestApp, TestContext};
use pet_alert_service::services::MockPushProvider;
use pet_alert_service::startup::AppState;
use reqwest::Client;
use std::sync::Arc;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn(AppState::new(
        Arc::new(seeded_directory()),
        Arc::new(MockPushProvider::new()),
    ))
    .await;

    let response = Client::new()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "pet-alert-service");
}

#[tokio::test]
async fn health_reports_unavailable_store() {
    let ctx = TestContext::new(InMemoryDirectory::unavailable(), MockPushProvider::new());

    let (status, body) = ctx.request(get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn readiness_follows_store() {
    let ready = TestContext::seeded();
    assert_eq!(ready.request(get("/ready")).await.0, StatusCode::OK);

    let not_ready =
        TestContext::new(InMemoryDirectory::unavailable(), MockPushProvider::new());
    assert_eq!(
        not_ready.request(get("/ready")).await.0,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn readiness_ignores_push_gateway() {
    let ctx = TestContext::new(
        seeded_directory(),
        MockPushProvider::failing("gateway unreachable"),
    );

    assert_eq!(ctx.request(get("/ready")).await.0, StatusCode::OK);
    assert_eq!(ctx.push.send_count(), 0);
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let ctx = TestContext::seeded();

    let (status, _) = ctx.request(get("/metrics")).await;

    assert_eq!(status, StatusCode::OK);
}
