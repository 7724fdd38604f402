use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::issue_token;
use crate::error::{AppError, AuthError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth", post(unlock))
}

#[derive(Debug, Deserialize)]
struct UnlockRequest {
    passphrase: String,
}

#[derive(Debug, Serialize)]
struct UnlockResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

async fn unlock(
    State(state): State<AppState>,
    Json(req): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, AppError> {
    let now = Utc::now();
    let Some(expires_at) = state.gate.unlock(&req.passphrase, now) else {
        tracing::warn!("Rejected unlock attempt");
        return Err(AuthError::WrongPassphrase.into());
    };

    let token = issue_token(now, expires_at, &state.config.jwt_secret)?;
    tracing::info!("Journal unlocked until {}", expires_at);

    Ok(Json(UnlockResponse { token, expires_at }))
}
