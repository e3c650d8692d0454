//! HTTP-level tests driving the axum app with `tower::ServiceExt::oneshot`.

use std::fs;
use std::path::Path;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use eventsub_mock_server::config::{ServerConfig, Settings, TemplatesConfig};
use eventsub_mock_server::server::{create_app, AppState};
use eventsub_mock_server::template::load_registry;

const CHANNEL_FOLLOW_V1: &str = r#"
metadata:
  type: channel.follow
  version: "1"
  supported_transports:
    - webhook
subscription:
  id:
    type: string
    ref: event_id
  type:
    type: string
    ref: subscription_type
  cost:
    type: int
    ref: cost
event:
  user_id:
    type: string
    ref: target_id
"#;

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn test_app() -> (TempDir, Router) {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "channel/follow-v1.yaml", CHANNEL_FOLLOW_V1);

    let registry = load_registry(tmp.path()).unwrap();
    let settings = Settings {
        server: ServerConfig::default(),
        templates: TemplatesConfig {
            dir: tmp.path().display().to_string(),
        },
    };

    let app = create_app(AppState::new(settings, registry));
    (tmp, app)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_trigger(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/events/trigger")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn trigger_returns_resolved_payload() {
    let (_tmp, app) = test_app();

    let response = app
        .oneshot(post_trigger(json!({
            "trigger_type": "channel.follow",
            "transport": "webhook",
            "version": "1",
            "event_id": "abc-1",
            "cost": 1,
            "to_user": "9001"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["subscription"]["id"], json!("abc-1"));
    assert_eq!(body["subscription"]["type"], json!("channel.follow"));
    assert_eq!(body["subscription"]["cost"], json!(1));
    assert_eq!(body["event"]["user_id"], json!("9001"));
}

#[tokio::test]
async fn trigger_defaults_missing_parameters() {
    let (_tmp, app) = test_app();

    let response = app
        .oneshot(post_trigger(json!({
            "trigger_type": "channel.follow",
            "transport": "webhook"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // Defaulted event id is a fresh UUID, cost falls back to zero
    assert!(!body["subscription"]["id"].as_str().unwrap().is_empty());
    assert_eq!(body["subscription"]["cost"], json!(0));
}

#[tokio::test]
async fn unknown_trigger_maps_to_not_found() {
    let (_tmp, app) = test_app();

    let response = app
        .oneshot(post_trigger(json!({
            "trigger_type": "no.such",
            "transport": "webhook",
            "version": "1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("UNKNOWN_TRIGGER"));
}

#[tokio::test]
async fn unsupported_transport_maps_to_bad_request() {
    let (_tmp, app) = test_app();

    let response = app
        .oneshot(post_trigger(json!({
            "trigger_type": "channel.follow",
            "transport": "websocket",
            "version": "1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("INVALID_TRANSPORT"));
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("WebSockets"));
}

#[tokio::test]
async fn health_reports_registry_counts() {
    let (_tmp, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["event_types"], json!(1));
    assert_eq!(body["references"], json!(0));
}

#[tokio::test]
async fn event_types_listing() {
    let (_tmp, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/event-types")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["event_types"][0]["type"], json!("channel.follow"));
    assert_eq!(
        body["event_types"][0]["supported_transports"],
        json!(["webhook"])
    );
}
