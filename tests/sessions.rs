mod common;

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ridejournal::pipeline::sync::SyncEvent;
use ridejournal::types::camera::Viewport;
use serde_json::json;
use tower::ServiceExt;

use common::day;

async fn open_session(app: axum::Router) -> String {
    let response = app
        .oneshot(common::authed_post(
            "/api/sessions",
            json!({ "viewport_width": 1280 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["active_day"], "1");
    body["session_id"].as_str().expect("session id").to_string()
}

#[tokio::test]
async fn session_follows_jump_events() {
    let app = common::app();
    let id = open_session(app.clone()).await;

    let response = app
        .oneshot(common::authed_post(
            &format!("/api/sessions/{}/events", id),
            json!({ "type": "jump_to_day", "day": 2 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["active_day"], "2");
    assert_eq!(body["scroll_to"], "2");
    assert_eq!(body["camera"]["kind"], "fit_bounds");
    assert_eq!(body["camera"]["duration_ms"], 600);
    assert_eq!(body["totals"]["miles"], 113.5);
    assert_eq!(body["progress_percent"], 3);
}

#[tokio::test]
async fn session_rejects_out_of_range_jump() {
    let app = common::app();
    let id = open_session(app.clone()).await;

    let response = app
        .oneshot(common::authed_post(
            &format!("/api/sessions/{}/events", id),
            json!({ "type": "jump_to_day", "day": 71 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_rejects_observed_day_past_the_trip() {
    let app = common::app();
    let id = open_session(app.clone()).await;
    let uri = format!("/api/sessions/{}/events", id);

    let response = app
        .clone()
        .oneshot(common::authed_post(
            &uri,
            json!({
                "type": "observe",
                "entries": [{ "day": 500, "intersecting": true, "visible_fraction": 0.5 }]
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The session stays where it was.
    let response = app
        .oneshot(common::authed_post(&uri, json!({ "type": "resize", "width": 1280 })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["active_day"], "1");
    assert_eq!(body["progress_percent"], 1);
}

#[tokio::test]
async fn session_enters_detail_for_a_day() {
    let app = common::app();
    let id = open_session(app.clone()).await;
    let uri = format!("/api/sessions/{}/events", id);

    let response = app
        .clone()
        .oneshot(common::authed_post(&uri, json!({ "type": "enter_detail", "day": 2 })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["active_day"], "2");
    assert_eq!(body["camera"]["kind"], "fly_to");
    assert_eq!(body["camera"]["pitch"], 65.0);

    let response = app
        .oneshot(common::authed_post(&uri, json!({ "type": "enter_detail", "day": 71 })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let response = common::app()
        .oneshot(common::authed_post(
            "/api/sessions/not-a-session/events",
            json!({ "type": "reset" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::app()
        .oneshot(common::authed_post(
            &format!("/api/sessions/{}/events", uuid::Uuid::new_v4()),
            json!({ "type": "reset" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_creation_requires_token() {
    let request = Request::builder()
        .uri("/api/sessions")
        .method("POST")
        .body(Body::empty())
        .expect("request");
    let response = common::app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn sessions_are_isolated() {
    let state = common::state_with(common::journey());
    let (first, _) = state.create_session(Viewport::default());
    let (second, _) = state.create_session(Viewport::new(400));
    assert_eq!(state.session_count(), 2);

    state
        .apply_event(first, SyncEvent::JumpToDay { day: day(3) }, Instant::now())
        .expect("jump");

    assert_eq!(state.session_active_day(first), Some(day(3)));
    assert_eq!(state.session_active_day(second), Some(day(1)));
}

#[test]
fn idle_sessions_are_evicted() {
    let state = common::state_with(common::journey());
    state.create_session(Viewport::default());

    state.evict_idle_sessions(Duration::from_secs(3600));
    assert_eq!(state.session_count(), 1);

    state.evict_idle_sessions(Duration::ZERO);
    assert_eq!(state.session_count(), 0);
}
