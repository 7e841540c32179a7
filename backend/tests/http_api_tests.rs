//! End-to-end requests through the axum router.

#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use shift_roster::db::repositories::LocalRepository;
use shift_roster::db::repository::FullRepository;
use shift_roster::http::{create_router, AppState};
use shift_roster::services::{SchedulingSettings, SeriesDetachPolicy};

fn app_with(settings: SchedulingSettings) -> Router {
    let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
    create_router(AppState::with_settings(repo, settings))
}

fn app() -> Router {
    app_with(SchedulingSettings::default())
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn night_shift(app: &Router) -> i64 {
    let (status, shift) = call(
        app,
        Method::POST,
        "/v1/shifts",
        Some(json!({
            "label": "Night",
            "start_time": "22:00",
            "end_time": "06:00",
            "color": "#1e293b"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    shift["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_reports_connected() {
    let (status, body) = call(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_invalid_shift_is_bad_request() {
    let (status, body) = call(
        &app(),
        Method::POST,
        "/v1/shifts",
        Some(json!({
            "label": "",
            "start_time": "08:00",
            "end_time": "16:00",
            "color": "#fff"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_list_and_render_week() {
    let app = app();
    let shift_id = night_shift(&app).await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/v1/assignments",
        Some(json!({
            "user_ids": [5],
            "shift_id": shift_id,
            "start_date": "2024-03-04",
            "end_date": "2024-03-06",
            "recurring": true,
            "recurring_until": "2024-03-20"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["created"].as_array().unwrap().len(), 9);
    assert!(created["series"]["id"].is_string());

    let (status, list) = call(
        &app,
        Method::GET,
        "/v1/assignments?start_date=2024-03-11&end_date=2024-03-17",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 3);

    let (status, view) = call(
        &app,
        Method::GET,
        "/v1/timeline?view=week&date=2024-03-13",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["start_date"], "2024-03-11");
    // Three nights, each split in two; Wednesday's spillover lands on Thursday.
    assert_eq!(view["bars"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_preview_stores_nothing() {
    let app = app();
    let (status, plan) = call(
        &app,
        Method::POST,
        "/v1/assignments/preview",
        Some(json!({
            "user_ids": [1, 2],
            "shift_id": 1,
            "start_date": "2024-03-04",
            "end_date": "2024-03-05"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["requests"].as_array().unwrap().len(), 4);

    let (_, list) = call(
        &app,
        Method::GET,
        "/v1/assignments?start_date=2024-03-01&end_date=2024-03-31",
        None,
    )
    .await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_scoped_delete_and_missing_target() {
    let app = app();
    let shift_id = night_shift(&app).await;
    let (_, created) = call(
        &app,
        Method::POST,
        "/v1/assignments",
        Some(json!({
            "user_ids": [5],
            "shift_id": shift_id,
            "start_date": "2024-03-04",
            "end_date": "2024-03-04",
            "recurring": true,
            "recurring_until": "2024-03-25"
        })),
    )
    .await;
    let rows = created["created"].as_array().unwrap();
    let second = &rows[1];
    let uri = format!(
        "/v1/assignments/{}?scope=following&recurring_group_id={}&date={}",
        second["id"],
        second["recurring_group_id"].as_str().unwrap(),
        second["date"].as_str().unwrap()
    );

    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 3);

    let (status, _) = call(&app, Method::DELETE, "/v1/assignments/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_relocate_respects_reject_policy() {
    let app = app_with(SchedulingSettings {
        series_detach_policy: SeriesDetachPolicy::Reject,
        ..Default::default()
    });
    let shift_id = night_shift(&app).await;
    let (_, created) = call(
        &app,
        Method::POST,
        "/v1/assignments",
        Some(json!({
            "user_ids": [5],
            "shift_id": shift_id,
            "start_date": "2024-03-04",
            "end_date": "2024-03-04",
            "recurring": true,
            "recurring_until": "2024-03-11"
        })),
    )
    .await;
    let id = created["created"][0]["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/v1/assignments/{}/relocate", id),
        Some(json!({ "target_date": "2024-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/v1/assignments/{}/relocate", id),
        Some(json!({ "target_date": "2024-03-04", "target_user_id": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["relocation"]["action"], "reassign");
}

#[tokio::test]
async fn test_clear_week_requires_bounds() {
    let (status, _) = call(
        &app(),
        Method::POST,
        "/v1/assignments/clear",
        Some(json!({ "kind": "clear_week", "start_date": "2024-03-04" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
