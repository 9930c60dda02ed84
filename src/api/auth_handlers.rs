//! Authentication route handlers — GitHub OAuth flow and current user.
//!
//! Endpoints:
//! - `GET /auth/github/start`    — Returns the GitHub authorization URL + signed state
//! - `GET /auth/github/callback` — Exchanges `code` (checked against `state`) for session credentials
//! - `GET /me`                   — Returns the authenticated user (protected)

use crate::api::handlers::{AppError, DataResponse};
use crate::auth::extractor::AuthUser;
use crate::auth::models::UserResponse;
use crate::auth::{AuthResult, AuthStart};
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

/// Query parameters of GET /auth/github/callback
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

/// GET /auth/github/start — Begin the login flow.
pub async fn start(State(state): State<AppState>) -> Json<DataResponse<AuthStart>> {
    DataResponse::new(state.auth.begin_flow())
}

/// GET /auth/github/callback — Complete the login flow.
///
/// Missing code or a state that fails verification → 400; provider failures
/// → 502/504 with a generic message.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<DataResponse<AuthResult>>, AppError> {
    let result = state.auth.complete_flow(&query.code, &query.state).await?;
    Ok(DataResponse::new(result))
}

/// GET /me — Returns the authenticated user's profile.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DataResponse<UserResponse>>, AppError> {
    let identity = state.store.get_by_id(user.identity_id).await?;
    Ok(DataResponse::new(UserResponse::from(identity)))
}

// ============================================================================
// Tests
// ============================================================================
