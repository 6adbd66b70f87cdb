// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, state::AppState, utils::jwt::sign_session_token};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Unlocks a new session with the shared access password.
///
/// A direct equality check against the configured value: no lockout, no
/// rate limiting, infinitely retryable. When no password is configured the
/// gate fails closed and every attempt is rejected.
/// On success, returns a Bearer token whose subject is the new session id.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let expected = match &state.config.access_password {
        Some(password) => password,
        None => {
            tracing::warn!("login attempted but ACCESS_PASSWORD is unset; gate stays locked");
            return Err(AppError::AuthError("Access is not configured".to_string()));
        }
    };

    if payload.password != *expected {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let session_id = state.sessions.create().await;
    let token = sign_session_token(
        session_id,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "expires_in": state.config.jwt_expiration,
    })))
}
