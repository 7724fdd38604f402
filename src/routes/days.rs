use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, DataError};
use crate::pipeline::stats::JourneyStats;
use crate::state::AppState;
use crate::types::journal::{DayCard, DaySummary, STORY_PLACEHOLDER};

use super::require_viewer;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/days", get(list_days))
        .route("/api/days/:day", get(day_card))
        .route("/api/days/:day/story", get(story))
        .route("/api/stats", get(stats))
}

async fn list_days(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DaySummary>>, AppError> {
    require_viewer(&state, &headers)?;
    Ok(Json(state.journey.summaries()))
}

async fn day_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(day): Path<String>,
) -> Result<Json<DayCard>, AppError> {
    require_viewer(&state, &headers)?;
    let day = state.journey.day(&day)?;
    Ok(Json(state.journey.day_card(day)))
}

/// The long-form markdown for a day. Days in the journal without a story
/// file get a placeholder; days missing from the journal are a 404.
async fn story(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(day): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_viewer(&state, &headers)?;
    let day = state.journey.day(&day)?;
    if state.journey.journal.get(day).is_none() {
        return Err(AppError::NotFound(format!("No journal entry for day {}", day)));
    }
    let path = state.journey.story_path(day);

    let body = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No story for day {} at {}", day, path.display());
            STORY_PLACEHOLDER.to_string()
        }
        Err(source) => return Err(DataError::Io { path, source }.into()),
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        body,
    ))
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    day: Option<String>,
}

async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<Json<JourneyStats>, AppError> {
    require_viewer(&state, &headers)?;
    let raw = query
        .day
        .ok_or_else(|| AppError::BadRequest("Missing day".to_string()))?;
    // Day 0 is the state before the first section loads.
    if raw.trim() == "0" {
        return Ok(Json(JourneyStats::before_start(state.journey.total_days)));
    }
    let day = state.journey.day(&raw)?;
    Ok(Json(JourneyStats::at(
        &state.journey.journal,
        day,
        state.journey.total_days,
    )))
}
