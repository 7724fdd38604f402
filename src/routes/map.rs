use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::journey::Journey;
use crate::pipeline::{animate, rasterize, render};
use crate::state::{AppState, PreviewKey, PreviewKind};
use crate::types::day::DayId;
use crate::types::route::{BoundingBox, FeatureCollection};
use crate::types::viz::{OutputConfig, PreviewFormat, RenderOptions};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/route", get(route))
        .route("/api/route/preview.png", get(preview))
        .route("/api/route/animation.png", get(animation))
        .route("/api/route/:day/bbox", get(day_bbox))
}

async fn route(State(state): State<AppState>) -> Json<FeatureCollection> {
    Json(state.journey.route.collection().clone())
}

async fn day_bbox(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<BoundingBox>, AppError> {
    let day = state.journey.day(&day)?;
    let bbox = state
        .journey
        .route
        .get(day)
        .and_then(|feature| feature.geometry.bbox())
        .ok_or_else(|| AppError::NotFound(format!("No route for day {}", day)))?;
    Ok(Json(bbox))
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    day: Option<String>,
    through: Option<String>,
    format: Option<String>,
}

impl PreviewQuery {
    fn day(&self, state: &AppState) -> Result<DayId, AppError> {
        let raw = self
            .day
            .as_deref()
            .or(self.through.as_deref())
            .ok_or_else(|| AppError::BadRequest("Missing day".to_string()))?;
        Ok(state.journey.day(raw)?)
    }

    fn format(&self) -> Result<PreviewFormat, AppError> {
        match self.format.as_deref() {
            None => Ok(PreviewFormat::default()),
            Some(raw) => PreviewFormat::from_str(raw).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Invalid format: {}. Use 'post', 'story', or 'wide'",
                    raw
                ))
            }),
        }
    }
}

async fn preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<impl IntoResponse, AppError> {
    let key = PreviewKey {
        kind: PreviewKind::Still,
        day: query.day(&state)?,
        format: query.format()?,
    };
    let bytes = cached_or_render(&state, key).await?;
    Ok(png_response("image/png", bytes))
}

async fn animation(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<impl IntoResponse, AppError> {
    let key = PreviewKey {
        kind: PreviewKind::Animation,
        day: query.day(&state)?,
        format: query.format()?,
    };
    let bytes = cached_or_render(&state, key).await?;
    Ok(png_response("image/apng", bytes))
}

async fn cached_or_render(state: &AppState, key: PreviewKey) -> Result<Arc<Vec<u8>>, AppError> {
    if let Some(bytes) = state.preview(&key) {
        tracing::debug!("Preview cache hit for {:?}", key);
        return Ok(bytes);
    }

    let journey = Arc::clone(&state.journey);
    let bytes = tokio::task::spawn_blocking(move || render_preview(&journey, key))
        .await
        .map_err(|err| AppError::Internal(format!("Render task failed: {}", err)))??;

    tracing::info!(
        "Rendered {:?} preview through day {} ({:?}): {} bytes",
        key.kind,
        key.day,
        key.format,
        bytes.len()
    );
    Ok(state.insert_preview(key, bytes))
}

fn render_preview(journey: &Journey, key: PreviewKey) -> Result<Vec<u8>, AppError> {
    let options = RenderOptions::for_format(key.format);
    let output = OutputConfig::for_options(&options);

    match key.kind {
        PreviewKind::Still => {
            let svg = render::render_progress_svg(&journey.route, &journey.photos, key.day, &options)?;
            let output = if options.label {
                output.with_label(format!("Day {} of {}", key.day, journey.total_days))
            } else {
                output
            };
            Ok(rasterize::rasterize(&svg, &output)?)
        }
        PreviewKind::Animation => Ok(animate::render_journey_apng(
            &journey.route,
            &journey.photos,
            key.day,
            journey.total_days,
            &options,
            &output,
        )?),
    }
}

fn png_response(content_type: &'static str, bytes: Arc<Vec<u8>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        bytes.as_ref().clone(),
    )
}

