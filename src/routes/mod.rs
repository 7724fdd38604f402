use axum::http::HeaderMap;
use axum::Router;

use crate::auth::{self, ViewerClaims};
use crate::error::AppError;
use crate::state::AppState;

pub mod days;
pub mod health;
pub mod map;
pub mod photos;
pub mod sessions;
pub mod unlock;

/// Every API route, ready for `with_state`.
pub fn api() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(unlock::router())
        .merge(map::router())
        .merge(days::router())
        .merge(photos::router())
        .merge(sessions::router())
}

/// Rejects the request unless it carries a valid viewer token.
pub(crate) fn require_viewer(state: &AppState, headers: &HeaderMap) -> Result<ViewerClaims, AppError> {
    Ok(auth::require_viewer(headers, &state.config.jwt_secret)?)
}
