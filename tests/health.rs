mod common;

use axum::http::StatusCode;
use tower::ServiceExt;

#[tokio::test]
async fn health_returns_ok() {
    let response = common::app()
        .oneshot(common::get("/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_bytes(response).await;
    let text = String::from_utf8(body).expect("utf8");
    assert!(text.contains("\"status\":\"ok\""));
    assert!(text.contains("\"route_days\":3"));
}

#[tokio::test]
async fn health_needs_no_token() {
    let response = common::app()
        .oneshot(common::get("/health"))
        .await
        .expect("response");
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
