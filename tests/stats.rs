mod common;

use axum::http::StatusCode;
use ridejournal::pipeline::stats::{progress_percent, totals, JourneyStats, Totals};
use ridejournal::types::journal::{JournalBook, JournalEntry};
use tower::ServiceExt;

use common::day;

#[test]
fn totals_sum_through_active_day() {
    let journal = common::journal();

    let first = totals(&journal, day(1));
    assert_eq!(first.miles, 52.5);
    assert_eq!(first.elevation, 2100.0);

    let second = totals(&journal, day(2));
    assert_eq!(second.miles, 113.5);
    assert_eq!(second.elevation, 5150.0);

    // The rest day and the empty days after it add nothing.
    assert_eq!(totals(&journal, day(3)), second);
    assert_eq!(totals(&journal, day(70)), second);
}

#[test]
fn totals_skip_entries_without_metrics() {
    let journal: JournalBook = [(
        day(1),
        JournalEntry {
            title: "Somewhere".to_string(),
            ..Default::default()
        },
    )]
    .into_iter()
    .collect();
    assert_eq!(totals(&journal, day(1)), Totals::default());
}

#[test]
fn totals_never_decrease() {
    let journal = common::journal();
    let mut previous = Totals::default();
    for n in 1..=10 {
        let current = totals(&journal, day(n));
        assert!(current.miles >= previous.miles);
        assert!(current.elevation >= previous.elevation);
        previous = current;
    }
}

#[test]
fn progress_rounds_to_whole_percent() {
    assert_eq!(progress_percent(day(1), 70), 1);
    assert_eq!(progress_percent(day(35), 70), 50);
    assert_eq!(progress_percent(day(12), 70), 17);
    assert_eq!(progress_percent(day(70), 70), 100);
}

#[test]
fn progress_is_clamped() {
    assert_eq!(progress_percent(day(80), 70), 100);
    assert_eq!(progress_percent(day(1), 0), 0);
}

#[test]
fn journey_stats_combine_both() {
    let stats = JourneyStats::at(&common::journal(), day(2), 70);
    assert_eq!(stats.day, Some(day(2)));
    assert_eq!(stats.total_days, 70);
    assert_eq!(stats.totals.miles, 113.5);
    assert_eq!(stats.progress_percent, 3);
}

#[tokio::test]
async fn stats_endpoint_reports_totals() {
    let response = common::app()
        .oneshot(common::authed_get("/api/stats?day=2"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["day"], "2");
    assert_eq!(body["totals"]["miles"], 113.5);
    assert_eq!(body["progress_percent"], 3);
}

#[tokio::test]
async fn stats_endpoint_needs_a_day() {
    let response = common::app()
        .oneshot(common::authed_get("/api/stats"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_before_the_first_day_are_zero() {
    let response = common::app()
        .oneshot(common::authed_get("/api/stats?day=0"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert!(body["day"].is_null());
    assert_eq!(body["totals"]["miles"], 0.0);
    assert_eq!(body["totals"]["elevation"], 0.0);
    assert_eq!(body["progress_percent"], 0);
}

#[tokio::test]
async fn stats_reject_days_past_the_trip() {
    let response = common::app()
        .oneshot(common::authed_get("/api/stats?day=71"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
