use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::types::photo::{self, Photo};

use super::require_viewer;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/photos", get(list_photos))
}

#[derive(Debug, Deserialize)]
struct PhotosQuery {
    day: Option<String>,
}

/// Photos reached by `day`, or the whole manifest without one.
async fn list_photos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PhotosQuery>,
) -> Result<Json<Vec<Photo>>, AppError> {
    require_viewer(&state, &headers)?;
    let photos = match query.day.as_deref() {
        Some(raw) => {
            let day = state.journey.day(raw)?;
            photo::visible(&state.journey.photos, day)
                .into_iter()
                .cloned()
                .collect()
        }
        None => state.journey.photos.clone(),
    };
    Ok(Json(photos))
}
