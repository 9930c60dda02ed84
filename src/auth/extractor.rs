//! AuthUser extractor for Axum handlers.
//!
//! Extracts the authenticated identity from request extensions
//! (populated by the `require_auth` middleware).

use crate::api::handlers::AppError;
use crate::auth::middleware::AuthContext;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Authenticated identity extracted from the request context.
///
/// Use this as a handler parameter to require authentication
/// and access the caller's identity:
///
/// ```rust,ignore
/// async fn my_handler(user: AuthUser) -> impl IntoResponse {
///     format!("Hello, #{}!", user.identity_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity_id: i64,
    pub external_id: i64,
    /// Present when the middleware could resolve the stored identity
    pub provider_access_token: Option<String>,
}

impl AuthUser {
    fn from_context(context: &AuthContext) -> Result<Self, AppError> {
        if context.identity_id <= 0 {
            return Err(AppError::Unauthorized);
        }

        Ok(Self {
            identity_id: context.identity_id,
            external_id: context.external_id,
            provider_access_token: context.provider_access_token.clone(),
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<AuthContext>()
            .ok_or(AppError::Unauthorized)?;

        Self::from_context(context)
    }
}

// ============================================================================
// Tests
// ============================================================================
