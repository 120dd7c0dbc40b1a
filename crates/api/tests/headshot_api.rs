//! Integration tests for the headshot proxy endpoints.
//!
//! None of these touch the database, so they run against a lazy pool.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get, lazy_pool, post_json, post_multipart};
use eventconnect_core::headshot::{PLACEHOLDER_FILE_ID, PLACEHOLDER_HEADSHOT_URL, PLACEHOLDER_TASK_ID};
use eventconnect_youcam::api::YouCamApi;
use eventconnect_youcam::YouCamProvider;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live_app(server: &MockServer) -> axum::Router {
    let provider = YouCamProvider::new(YouCamApi::new(server.uri(), "test-key"));
    common::build_test_app_with_provider(lazy_pool(), Arc::new(provider))
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn placeholder_upload_returns_mock_file_id() {
    let app = common::build_test_app(lazy_pool());
    let response = post_multipart(app, "/api/v1/headshots/upload", "file", "me.jpg", b"jpegbytes").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["file_id"], PLACEHOLDER_FILE_ID);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = common::build_test_app(lazy_pool());
    let response = post_multipart(app, "/api/v1/headshots/upload", "photo", "me.jpg", b"jpegbytes").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "No file provided");
}

#[tokio::test]
async fn empty_file_is_rejected() {
    let app = common::build_test_app(lazy_pool());
    let response = post_multipart(app, "/api/v1/headshots/upload", "file", "me.jpg", b"").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_fails_with_payload_too_large() {
    let app = common::build_test_app(lazy_pool());
    let limit = common::test_config().max_upload_bytes;
    let bytes = vec![0u8; limit + 1024];

    let response = post_multipart(app, "/api/v1/headshots/upload", "file", "huge.jpg", &bytes).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn live_upload_failure_carries_provider_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/s2s/v2.0/file/headshot"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "file too small"
        })))
        .mount(&server)
        .await;

    let response = post_multipart(live_app(&server), "/api/v1/headshots/upload", "file", "me.jpg", b"x").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PROVIDER_ERROR");
    assert_eq!(json["details"]["error"], "file too small");
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn placeholder_generate_returns_mock_task_id() {
    let app = common::build_test_app(lazy_pool());
    let response = post_json(
        app,
        "/api/v1/headshots/generate",
        json!({"file_id": PLACEHOLDER_FILE_ID}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["task_id"], PLACEHOLDER_TASK_ID);
}

#[tokio::test]
async fn generate_requires_file_id() {
    let app = common::build_test_app(lazy_pool());
    let response = post_json(app, "/api/v1/headshots/generate", json!({"file_id": "  "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn live_generate_returns_provider_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s2s/v2.0/task/template/headshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"templates": [{"template_id": "studio"}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/s2s/v2.0/task/headshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"task_id": "live-task"}
        })))
        .mount(&server)
        .await;

    let response = post_json(
        live_app(&server),
        "/api/v1/headshots/generate",
        json!({"file_id": "file-1"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["task_id"], "live-task");
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn placeholder_status_is_success_with_stock_portrait() {
    let app = common::build_test_app(lazy_pool());
    let uri = format!("/api/v1/headshots/status?task_id={PLACEHOLDER_TASK_ID}");
    let response = get(app, &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["task_status"], "success");
    assert_eq!(json["results"]["images"][0], PLACEHOLDER_HEADSHOT_URL);
}

#[tokio::test]
async fn status_requires_task_id() {
    let app = common::build_test_app(lazy_pool());
    let response = get(app, "/api/v1/headshots/status").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn live_status_passes_running_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s2s/v2.0/task/headshot/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"task_status": "running"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = get(live_app(&server), "/api/v1/headshots/status?task_id=t-1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["task_status"], "running");
    assert!(json.get("results").is_none());
}
