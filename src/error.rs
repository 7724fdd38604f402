use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Invalid day: {0}")]
    InvalidDay(String),
    #[error("Day {day} is outside the journey (1..={total})")]
    DayOutOfRange { day: u16, total: u16 },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Wrong passphrase")]
    WrongPassphrase,
    #[error("Missing Bearer token")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Unknown viewer session: {0}")]
    UnknownSession(String),
    #[error("Unknown photo: {0}")]
    UnknownPhoto(String),
    #[error("Day {day} is outside the journey (1-{total})")]
    DayOutOfRange { day: u16, total: u16 },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid GPX: {0}")]
    InvalidGpx(String),
    #[error("No track points found in file")]
    EmptyFile,
}

/// Failures of the offline GPX import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("Need at least 2 track points, got {0}")]
    InsufficientPoints(usize),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("Failed to write route: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("SVG generation failed: {0}")]
    SvgError(String),
    #[error("No route recorded through day {0}")]
    NoRoute(u16),
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("PNG rendering failed: {0}")]
    RenderFailed(String),
    #[error("Animation rendering failed: {0}")]
    AnimationFailed(String),
}

/// An animation fails either because there is nothing to draw or because
/// drawing it failed.
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Failures of the offline photo step. They never reach the HTTP layer; the
/// photo is skipped and the reason logged.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("No GPS data in {0}")]
    NoGps(PathBuf),
    #[error("Photo {path} was taken before the trip started (day {day})")]
    BeforeTrip { path: PathBuf, day: i64 },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AnimationError> for AppError {
    fn from(err: AnimationError) -> Self {
        match err {
            AnimationError::Render(err) => AppError::Render(err),
            AnimationError::Raster(err) => AppError::Raster(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Data(DataError::InvalidDay(_) | DataError::DayOutOfRange { .. })
            | AppError::Sync(SyncError::DayOutOfRange { .. })
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Signing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Sync(_) | AppError::NotFound(_) | AppError::Render(RenderError::NoRoute(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Data(_)
            | AppError::Render(_)
            | AppError::Raster(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
