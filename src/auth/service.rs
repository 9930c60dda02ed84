//! Login flow orchestration.
//!
//! `begin_flow` mints a signed state and the provider redirect URL;
//! `complete_flow` verifies the state, runs the provider round trip,
//! reconciles the local identity and issues the session credentials. No
//! intermediate state is persisted between the two calls.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::error::{AuthError, Result};
use crate::auth::github::{authorization_url, IdentityProvider};
use crate::auth::jwt::{TokenCodec, TokenKind};
use crate::auth::models::{TokenPair, UserResponse};
use crate::auth::state::{timestamp_nonce, StateSigner};
use crate::auth::store::IdentityStore;
use crate::{Config, GitHubConfig};

/// Response of [`AuthService::begin_flow`]
#[derive(Debug, Clone, Serialize)]
pub struct AuthStart {
    pub authorization_url: String,
    pub state: String,
}

/// Response of [`AuthService::complete_flow`]
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub user: UserResponse,
    pub token: TokenPair,
}

/// Composes state signing, the provider client, the identity store and the
/// token codec into the two login entry points.
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn IdentityStore>,
    tokens: Arc<TokenCodec>,
    state_signer: StateSigner,
    github: GitHubConfig,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn IdentityStore>,
        tokens: Arc<TokenCodec>,
        state_signer: StateSigner,
        github: GitHubConfig,
    ) -> Self {
        Self {
            provider,
            store,
            tokens,
            state_signer,
            github,
        }
    }

    /// Wire a service from the application config.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn IdentityStore>,
        tokens: Arc<TokenCodec>,
    ) -> Self {
        Self::new(
            provider,
            store,
            tokens,
            StateSigner::new(&config.auth.state_secret),
            config.github.clone(),
        )
    }

    /// Start a login: sign a fresh state and build the provider redirect.
    pub fn begin_flow(&self) -> AuthStart {
        let state = self.state_signer.sign(&timestamp_nonce(Utc::now()));
        AuthStart {
            authorization_url: authorization_url(&self.github, &state),
            state,
        }
    }

    /// Finish a login from the provider callback.
    ///
    /// Steps run strictly in order and the first failure aborts the rest. A
    /// store failure after a successful provider round trip is not
    /// compensated.
    pub async fn complete_flow(&self, code: &str, state: &str) -> Result<AuthResult> {
        if code.is_empty() {
            return Err(AuthError::MissingAuthorizationCode);
        }
        if !self.state_signer.verify(state) {
            tracing::warn!("Rejected login callback with invalid state");
            return Err(AuthError::InvalidState);
        }

        let provider_token = self.provider.exchange_code(code).await.inspect_err(|e| {
            tracing::warn!("Provider code exchange failed: {}", e);
        })?;

        let profile = self
            .provider
            .fetch_profile(&provider_token)
            .await
            .inspect_err(|e| tracing::warn!("Provider profile fetch failed: {}", e))?;

        // The provider issues no refresh token in this flow.
        let identity = self
            .store
            .upsert(&profile, &provider_token, None)
            .await
            .map_err(|e| match e {
                AuthError::Store(inner) => AuthError::Store(inner.context("persist identity")),
                other => other,
            })?;

        let now = Utc::now();
        let access_token = self.tokens.issue(TokenKind::Access, &identity, now)?;
        let refresh_token = self.tokens.issue(TokenKind::Refresh, &identity, now)?;

        tracing::info!(
            identity_id = identity.id,
            external_id = identity.external_id,
            "Login completed"
        );

        Ok(AuthResult {
            user: UserResponse::from(identity),
            token: TokenPair {
                access_token,
                refresh_token,
                expires_in_seconds: self.tokens.ttl_secs(TokenKind::Access),
            },
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
