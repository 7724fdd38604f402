#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use chrono::Utc;
use ridejournal::{
    auth::issue_token,
    config::Config,
    journey::Journey,
    routes,
    state::AppState,
    types::{
        day::DayId,
        journal::{DayMetrics, JournalBook, JournalEntry},
        photo::Photo,
        route::{FeatureCollection, FeatureProperties, Geometry, Position, RouteFeature},
        weather::Weather,
    },
};
use serde_json::Value;

pub const SECRET: &str = "test-secret";

pub fn day(n: u16) -> DayId {
    DayId::new(n).expect("day")
}

pub fn feature(n: u16, coords: &[(f64, f64)]) -> RouteFeature {
    RouteFeature::new(
        FeatureProperties {
            day: day(n),
            date: Some(format!("2025-05-{}", 16 + n)),
            weather: None,
            extra: Default::default(),
        },
        Geometry::LineString {
            coordinates: coords
                .iter()
                .map(|(lng, lat)| Position::new(*lng, *lat))
                .collect(),
        },
    )
}

/// Days 1-3 ridden, day 3 a rest day, nothing recorded after.
pub fn route() -> FeatureCollection {
    let mut day_one = feature(1, &[(-97.74, 30.27), (-98.10, 30.40), (-98.41, 30.52)]);
    day_one.properties.weather = Some(Weather {
        code: 61,
        max: 88.4,
        min: 70.6,
        precip: 0.125,
    });
    FeatureCollection::new(vec![
        day_one,
        feature(2, &[(-98.41, 30.52), (-98.90, 30.75), (-99.14, 30.85)]),
        feature(3, &[(-99.14, 30.85), (-99.15, 30.86)]),
    ])
}

pub fn journal() -> JournalBook {
    [
        (
            day(1),
            JournalEntry {
                title: "Marble Falls".to_string(),
                content: Some("Out of Austin into the hills.".to_string()),
                metrics: Some(DayMetrics {
                    miles: 52.5,
                    elevation: 2100.0,
                }),
                ..Default::default()
            },
        ),
        (
            day(2),
            JournalEntry {
                title: "Mason".to_string(),
                metrics: Some(DayMetrics {
                    miles: 61.0,
                    elevation: 3050.0,
                }),
                ..Default::default()
            },
        ),
        (
            day(3),
            JournalEntry {
                title: "Mason".to_string(),
                is_rest_day: true,
                metrics: Some(DayMetrics {
                    miles: 0.0,
                    elevation: 0.0,
                }),
                ..Default::default()
            },
        ),
    ]
    .into_iter()
    .collect()
}

pub fn photo(id: &str, n: u16) -> Photo {
    Photo {
        id: id.to_string(),
        day: day(n),
        coordinates: [-98.0 - n as f64 * 0.1, 30.4],
        url: format!("/photos/display/{}.jpg", id),
        caption: Some(format!("{}.HEIC", id)),
    }
}

pub fn photos() -> Vec<Photo> {
    vec![
        photo("IMG_0001", 1),
        photo("IMG_0002", 1),
        photo("IMG_0010", 2),
        photo("IMG_0020", 3),
        photo("IMG_0100", 5),
    ]
}

pub fn stories_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ridejournal-stories-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("stories dir");
    dir
}

pub fn journey() -> Journey {
    Journey::from_parts(route(), journal(), photos(), stories_dir(), 70)
}

pub fn config() -> Config {
    Config {
        jwt_secret: SECRET.to_string(),
        ..Config::default()
    }
}

pub fn state_with(journey: Journey) -> AppState {
    AppState::new(config(), journey)
}

pub fn app_with(state: AppState) -> Router {
    routes::api().with_state(state)
}

pub fn app() -> Router {
    app_with(state_with(journey()))
}

pub fn token() -> String {
    let now = Utc::now();
    issue_token(now, now + chrono::Duration::hours(24), SECRET).expect("token")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .expect("request")
}

pub fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header("authorization", format!("Bearer {}", token()))
        .body(Body::empty())
        .expect("request")
}

pub fn authed_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("authorization", format!("Bearer {}", token()))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
