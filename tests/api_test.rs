use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use counter_timers::{
    api::create_router,
    state::{AppState, SuspensionStore},
    utils::ManualClock,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap(),
    ));
    let (state, _tick_rx) = AppState::new(
        0,
        "127.0.0.1".to_string(),
        clock.clone(),
        SuspensionStore::in_memory(),
    );
    (create_router(Arc::new(state)), clock)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_add_and_list_timers() {
    let (app, _) = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/timers",
        Some(json!({ "hours": 1, "minutes": 2, "seconds": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "not_started");
    assert_eq!(body["status_label"], "Not Started");
    assert_eq!(body["button"], "Start");
    assert_eq!(body["remaining"], "1 hr  2 min  5 sec");
    assert_eq!(body["title"], "1.");

    call(&app, Method::POST, "/timers", Some(json!({ "seconds": 30 }))).await;

    let (status, body) = call(&app, Method::GET, "/timers", None).await;
    assert_eq!(status, StatusCode::OK);
    let timers = body.as_array().unwrap();
    assert_eq!(timers.len(), 2);
    assert_eq!(timers[1]["row"], 2);
    assert_eq!(timers[1]["total_seconds"], 30.0);
}

#[tokio::test]
async fn test_empty_duration_is_rejected() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::POST, "/timers", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_unknown_timer_is_not_found() {
    let (app, _) = app();
    let (status, _) = call(&app, Method::POST, "/timers/99/toggle", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_cycles_button() {
    let (app, _) = app();
    let (_, timer) = call(&app, Method::POST, "/timers", Some(json!({ "seconds": 10 }))).await;
    let id = timer["id"].as_u64().unwrap();

    let (_, body) = call(&app, Method::POST, &format!("/timers/{}/toggle", id), None).await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["timer"]["status_label"], "Started");
    assert_eq!(body["timer"]["button"], "Pause");
    assert_eq!(body["timer"]["ticking"], true);

    let (_, body) = call(&app, Method::POST, &format!("/timers/{}/toggle", id), None).await;
    assert_eq!(body["timer"]["status_label"], "Paused");
    assert_eq!(body["timer"]["button"], "Resume");

    let (_, body) = call(&app, Method::POST, &format!("/timers/{}/toggle", id), None).await;
    assert_eq!(body["timer"]["status_label"], "In Progress");
}

#[tokio::test]
async fn test_invalid_command_is_ignored_not_failed() {
    let (app, _) = app();
    let (_, timer) = call(&app, Method::POST, "/timers", Some(json!({ "seconds": 10 }))).await;
    let id = timer["id"].as_u64().unwrap();

    let (status, body) = call(&app, Method::POST, &format!("/timers/{}/pause", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["timer"]["status_label"], "Not Started");
}

#[tokio::test]
async fn test_detach_attach_reconciles_gap() {
    let (app, clock) = app();
    let (_, timer) = call(&app, Method::POST, "/timers", Some(json!({ "seconds": 40 }))).await;
    let id = timer["id"].as_u64().unwrap();

    call(&app, Method::POST, &format!("/timers/{}/start", id), None).await;
    let (_, body) = call(&app, Method::POST, &format!("/timers/{}/detach", id), None).await;
    assert_eq!(body["timer"]["attached"], false);
    assert_eq!(body["timer"]["ticking"], false);

    clock.advance_secs(10);
    let (_, body) = call(
        &app,
        Method::POST,
        &format!("/timers/{}/attach", id),
        Some(json!({ "width": 100.0, "height": 100.0 })),
    )
    .await;
    assert_eq!(body["timer"]["remaining_seconds"], 30.0);
    assert_eq!(body["timer"]["status"], "in_progress");
    assert_eq!(body["timer"]["progress"]["layers"], 1);
    assert_eq!(body["timer"]["progress"]["end_angle"], 0.0);
}

#[tokio::test]
async fn test_background_foreground_cycle() {
    let (app, clock) = app();
    let (_, timer) = call(&app, Method::POST, "/timers", Some(json!({ "seconds": 20 }))).await;
    let id = timer["id"].as_u64().unwrap();
    call(&app, Method::POST, &format!("/timers/{}/start", id), None).await;

    let (_, body) = call(&app, Method::POST, "/app/background", None).await;
    assert_eq!(body["suspended_timers"], 1);

    let (_, status) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(status["backgrounded"], true);

    clock.advance_secs(25);
    let (_, body) = call(&app, Method::POST, "/app/foreground", None).await;
    assert_eq!(body["gap_seconds"], 25.0);

    let (_, timer) = call(&app, Method::GET, &format!("/timers/{}", id), None).await;
    assert_eq!(timer["status_label"], "Completed");
    assert_eq!(timer["remaining"], "0 hr  0 min  0 sec");
    assert_eq!(timer["progress"]["complete"], true);
    assert_eq!(timer["button"], "Start");
}

#[tokio::test]
async fn test_remove_timer() {
    let (app, _) = app();
    let (_, timer) = call(&app, Method::POST, "/timers", Some(json!({ "minutes": 1 }))).await;
    let id = timer["id"].as_u64().unwrap();
    call(&app, Method::POST, &format!("/timers/{}/start", id), None).await;

    let (status, _) = call(&app, Method::DELETE, &format!("/timers/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, &format!("/timers/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
