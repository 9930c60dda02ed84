//! Auth middleware for Axum routes.
//!
//! Validates access credentials from the `Authorization: Bearer` header and
//! injects an [`AuthContext`] into request extensions. Every rejection cause
//! (missing header, wrong scheme, bad signature, expiry) surfaces as the same
//! generic 401.

use crate::api::handlers::AppError;
use crate::auth::error::{AuthError, Result};
use crate::auth::jwt::{TokenCodec, TokenKind};
use crate::auth::store::IdentityStore;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Identity resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub identity_id: i64,
    pub external_id: i64,
    /// Provider token of the identity, when the store lookup succeeded
    pub provider_access_token: Option<String>,
}

/// Pull the credential out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authenticate a request from its headers.
///
/// The identity store lookup is best-effort: when it fails the request is
/// still authenticated, just without a provider token.
pub async fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenCodec,
    store: &dyn IdentityStore,
) -> Result<AuthContext> {
    let token = bearer_token(headers).ok_or(AuthError::Unauthorized)?;

    let claims = tokens.parse(TokenKind::Access, token).map_err(|e| {
        tracing::debug!("Rejected access credential: {}", e);
        AuthError::Unauthorized
    })?;

    let provider_access_token = match store.get_by_id(claims.identity_id).await {
        Ok(identity) => Some(identity.provider_access_token),
        Err(e) => {
            tracing::debug!(
                identity_id = claims.identity_id,
                "Identity lookup skipped: {}",
                e
            );
            None
        }
    };

    Ok(AuthContext {
        identity_id: claims.identity_id,
        external_id: claims.external_id,
        provider_access_token,
    })
}

/// Middleware that requires a valid access credential.
///
/// # Behavior
/// 1. Extract `Authorization: Bearer <token>` → 401 if missing
/// 2. Validate with the access key → 401 if invalid/expired
/// 3. Resolve the stored identity (best-effort) for its provider token
/// 4. Inject `AuthContext` into request extensions for downstream handlers
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let context = authenticate(req.headers(), &state.tokens, state.store.as_ref()).await?;

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

// ============================================================================
// Tests
// ============================================================================
