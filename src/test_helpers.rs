//! Test helper factories and mock state builders
//!
//! Provides convenience functions for creating test objects with sensible defaults,
//! and helpers for building AppState instances around a stub identity provider.
#![allow(dead_code)]

use crate::auth::error::{AuthError, Result};
use crate::auth::github::IdentityProvider;
use crate::auth::jwt::TokenCodec;
use crate::auth::models::{LocalIdentity, ProviderProfile};
use crate::auth::store::MemoryIdentityStore;
use crate::{AppState, AuthConfig, Config, GitHubConfig, ServerConfig};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Config builders
// ============================================================================

/// GitHub config pointing at the real endpoints with test credentials
pub fn test_github_config() -> GitHubConfig {
    GitHubConfig {
        client_id: "test-client-id".to_string(),
        client_secret: "test-client-secret".to_string(),
        redirect_uri: Some("http://localhost:8080/auth/github/callback".to_string()),
        ..GitHubConfig::default()
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        access_secret: "test-access-secret-at-least-32-chars".to_string(),
        refresh_secret: "test-refresh-secret-at-least-32-chars".to_string(),
        state_secret: "test-state-secret".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 604800,
    }
}

/// A complete, valid config
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            cors_origins: Vec::new(),
        },
        auth: test_auth_config(),
        github: test_github_config(),
    }
}

/// Codec sharing the secrets of [`test_config`]
pub fn test_codec() -> TokenCodec {
    TokenCodec::from_config(&test_config().auth)
}

// ============================================================================
// Model factories
// ============================================================================

pub fn test_identity(id: i64, external_id: i64) -> LocalIdentity {
    LocalIdentity {
        id,
        external_id,
        login_name: format!("user{}", external_id),
        email: None,
        avatar_url: String::new(),
        provider_access_token: "gho_test".to_string(),
        provider_refresh_token: None,
    }
}

pub fn test_profile(external_id: i64, login_name: &str) -> ProviderProfile {
    ProviderProfile {
        external_id,
        login_name: login_name.to_string(),
        email: Some(format!("{}@example.com", login_name)),
        avatar_url: "http://avatar".to_string(),
    }
}

// ============================================================================
// Stub identity provider
// ============================================================================

/// In-process identity provider that records how often it was called.
pub struct StubProvider {
    profile: ProviderProfile,
    fail_exchange: bool,
    pub exchange_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
}

impl Default for StubProvider {
    fn default() -> Self {
        Self::returning(test_profile(1, "octocat"))
    }
}

impl StubProvider {
    /// Provider token handed out by every successful exchange
    pub const TOKEN: &'static str = "gho_stub_token";

    pub fn returning(profile: ProviderProfile) -> Self {
        Self {
            profile,
            fail_exchange: false,
            exchange_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// A provider that rejects every authorization code
    pub fn failing_exchange() -> Self {
        Self {
            fail_exchange: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn exchange_code(&self, _code: &str) -> Result<String> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(AuthError::provider(
                "exchange code",
                "bad_verification_code: The code passed is incorrect or expired.",
            ));
        }
        Ok(Self::TOKEN.to_string())
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if access_token != Self::TOKEN {
            return Err(AuthError::provider("fetch profile", "401 Bad credentials"));
        }
        Ok(self.profile.clone())
    }
}

// ============================================================================
// App state builders
// ============================================================================

/// AppState with a default stub provider and an empty in-memory store
pub fn test_app_state() -> AppState {
    test_app_state_with(Arc::new(StubProvider::default()))
}

/// AppState around the given stub provider and an empty in-memory store
pub fn test_app_state_with(provider: Arc<StubProvider>) -> AppState {
    AppState::with_components(
        test_config(),
        provider,
        Arc::new(MemoryIdentityStore::new()),
    )
}
