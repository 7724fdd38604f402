use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, SyncError};
use crate::pipeline::stats::{self, Totals};
use crate::pipeline::sync::{SyncEvent, SyncOutcome};
use crate::state::AppState;
use crate::types::camera::Viewport;
use crate::types::day::DayId;

use super::require_viewer;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id/events", post(apply_event))
}

#[derive(Debug, Default, Deserialize)]
struct CreateSessionRequest {
    viewport_width: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: Uuid,
    active_day: DayId,
}

async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    require_viewer(&state, &headers)?;
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let viewport = req.viewport_width.map(Viewport::new).unwrap_or_default();

    let (session_id, active_day) = state.create_session(viewport);
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            active_day,
        }),
    ))
}

/// The synchronizer's answer plus the header numbers for the new active day.
#[derive(Debug, Serialize)]
struct EventResponse {
    #[serde(flatten)]
    outcome: SyncOutcome,
    totals: Totals,
    progress_percent: u32,
}

async fn apply_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(event): Json<SyncEvent>,
) -> Result<Json<EventResponse>, AppError> {
    require_viewer(&state, &headers)?;
    let id = Uuid::parse_str(&id).map_err(|_| SyncError::UnknownSession(id.clone()))?;

    let outcome = state.apply_event(id, event, Instant::now())?;
    tracing::debug!("Session {} now on day {}", id, outcome.active_day);

    let journey = &state.journey;
    Ok(Json(EventResponse {
        totals: stats::totals(&journey.journal, outcome.active_day),
        progress_percent: stats::progress_percent(outcome.active_day, journey.total_days),
        outcome,
    }))
}
