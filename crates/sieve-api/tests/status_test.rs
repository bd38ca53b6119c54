mod helpers;

use helpers::*;
use sieve_core::UploadStatus;
use std::time::Duration;

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .get(&format!("/status/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unparseable_id_is_not_found() {
    let app = setup_test_app().await;
    let response = app.client().get("/status/not-a-uuid").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_status_body_shape() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = upload(client, Some("10.9.0.1"), "notes.txt", b"hello world").await;
    let id = processing_id(&response);
    assert!(wait_for_status(client, &id, UploadStatus::Completed, Duration::from_secs(3)).await);

    let body: serde_json::Value = client.get(&format!("/status/{}", id)).await.json();
    assert_eq!(body["status"], "Completed");
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn test_health_reports_pipeline_snapshot() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["queue_capacity"], 100);
    assert_eq!(body["tracked_uploads"], 0);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/upload"].is_object());
    assert!(body["paths"]["/status/{id}"].is_object());
}

#[tokio::test]
async fn test_shutdown_stops_worker_and_marks_health_degraded() {
    let app = setup_test_app().await;
    let state = app.app.state.clone();
    let server = app.server;

    tokio::time::timeout(Duration::from_secs(2), app.app.shutdown())
        .await
        .expect("shutdown should complete promptly");

    assert!(state.queue.is_closed());
    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["status"], "degraded");

    let response = upload(&server, Some("10.9.0.2"), "late.txt", b"text").await;
    assert_eq!(response.status_code(), 503);
    assert!(state.status_store.is_empty());
}
