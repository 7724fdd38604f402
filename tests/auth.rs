mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use ridejournal::auth::{issue_token, verify_token, AuthGate};
use serde_json::json;
use tower::ServiceExt;

fn gate() -> AuthGate {
    AuthGate::new("whatever the weather", Duration::from_secs(24 * 3600))
}

fn unlock_request(passphrase: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/auth")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "passphrase": passphrase }).to_string()))
        .expect("request")
}

#[test]
fn passphrase_ignores_case_and_surrounding_space() {
    let gate = gate();
    assert!(gate.accepts("whatever the weather"));
    assert!(gate.accepts("  Whatever The WEATHER \n"));
    assert!(!gate.accepts("whatever the  weather"));
    assert!(!gate.accepts(""));
}

#[test]
fn empty_passphrase_never_unlocks() {
    let gate = AuthGate::new("   ", Duration::from_secs(60));
    assert!(!gate.accepts(""));
    assert!(!gate.accepts("   "));
}

#[test]
fn unlock_lasts_one_window() {
    let gate = gate();
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    let expiry = gate.unlock("Whatever the weather", now).expect("unlocked");
    assert_eq!(expiry, now + chrono::Duration::hours(24));

    assert!(AuthGate::is_unlocked(Some(expiry), now));
    assert!(AuthGate::is_unlocked(
        Some(expiry),
        now + chrono::Duration::hours(23)
    ));
    assert!(!AuthGate::is_unlocked(Some(expiry), expiry));
    assert!(!AuthGate::is_unlocked(None, now));
}

#[test]
fn wrong_passphrase_grants_nothing() {
    let now = Utc::now();
    assert!(gate().unlock("sunny days", now).is_none());
}

#[test]
fn token_round_trips_with_matching_secret() {
    let now = Utc::now();
    let token = issue_token(now, now + chrono::Duration::hours(1), "secret").expect("token");

    let claims = verify_token(&token, "secret").expect("claims");
    assert_eq!(claims.sub, "viewer");
    assert!(verify_token(&token, "other-secret").is_err());
}

#[test]
fn expired_token_is_rejected() {
    let issued = Utc::now() - chrono::Duration::hours(48);
    let token = issue_token(issued, issued + chrono::Duration::hours(24), "secret").expect("token");
    assert!(verify_token(&token, "secret").is_err());
}

#[tokio::test]
async fn unlock_returns_token() {
    let response = common::app()
        .oneshot(unlock_request("WHATEVER THE WEATHER"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let token = body["token"].as_str().expect("token");
    assert!(verify_token(token, common::SECRET).is_ok());
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn unlock_rejects_wrong_passphrase() {
    let response = common::app()
        .oneshot(unlock_request("let me in"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Wrong passphrase");
}

#[tokio::test]
async fn journal_requires_token() {
    let response = common::app()
        .oneshot(common::get("/api/days/1"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn journal_rejects_garbage_token() {
    let request = Request::builder()
        .uri("/api/days")
        .header("authorization", "Bearer not-a-token")
        .body(Body::empty())
        .expect("request");
    let response = common::app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
