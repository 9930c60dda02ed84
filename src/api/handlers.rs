//! Shared API plumbing: error mapping and the health endpoint.

use crate::auth::AuthError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Envelope for successful responses: `{"data": ...}`
#[derive(Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

// ============================================================================
// Error handling
// ============================================================================

/// API error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    /// Always rendered with the same generic message
    Unauthorized,
    BadGateway,
    GatewayTimeout,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::BadGateway => (
                StatusCode::BAD_GATEWAY,
                "identity provider request failed".to_string(),
            ),
            AppError::GatewayTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "identity provider did not respond".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": true,
            "message": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthorizationCode | AuthError::InvalidState => {
                AppError::BadRequest(err.to_string())
            }
            AuthError::Provider(_) => AppError::BadGateway,
            AuthError::ProviderTimeout => AppError::GatewayTimeout,
            AuthError::InvalidCredential | AuthError::Unauthorized => AppError::Unauthorized,
            AuthError::NotFound => AppError::NotFound("user not found".to_string()),
            AuthError::MissingIdentity | AuthError::Store(_) | AuthError::Token(_) => {
                AppError::Internal(anyhow::Error::new(err))
            }
        }
    }
}
