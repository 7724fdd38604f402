use std::time::Duration;

use axum::http::HeaderMap;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Passphrase gate in front of the journal. It keeps casual visitors out; it
/// is not an access-control mechanism.
#[derive(Debug, Clone)]
pub struct AuthGate {
    passphrase: String,
    window: Duration,
}

impl AuthGate {
    pub fn new(passphrase: &str, window: Duration) -> Self {
        Self {
            passphrase: normalize(passphrase),
            window,
        }
    }

    pub fn accepts(&self, input: &str) -> bool {
        !self.passphrase.is_empty() && normalize(input) == self.passphrase
    }

    /// Expiry of the unlock granted by `input` at `now`, if it is the passphrase.
    pub fn unlock(&self, input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.accepts(input) {
            return None;
        }
        let window = chrono::Duration::from_std(self.window).ok()?;
        now.checked_add_signed(window)
    }

    pub fn is_unlocked(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        expiry.is_some_and(|expiry| now < expiry)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

impl ViewerClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp as i64, 0).single()
    }
}

pub fn issue_token(
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    secret: &str,
) -> Result<String, AuthError> {
    let claims = ViewerClaims {
        sub: "viewer".to_string(),
        iat: now.timestamp().max(0) as usize,
        exp: expires_at.timestamp().max(0) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| AuthError::Signing(err.to_string()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<ViewerClaims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<ViewerClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthError::InvalidToken)?;
    Ok(token_data.claims)
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?;
    let raw = value.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(|token| token.trim().to_string())
}

/// Checks the request's Bearer token against `secret`.
pub fn require_viewer(headers: &HeaderMap, secret: &str) -> Result<ViewerClaims, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    verify_token(&token, secret)
}
