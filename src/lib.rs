//! Forge Auth
//!
//! GitHub login for the API:
//! - HMAC-signed anti-CSRF state for the authorization redirect
//! - Authorization code exchange and profile fetch against GitHub
//! - Create-or-update reconciliation of local identities
//! - HS256 access/refresh session credentials and a Bearer middleware

pub mod api;
pub mod auth;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::auth::github::{GitHubClient, IdentityProvider};
use crate::auth::jwt::TokenCodec;
use crate::auth::store::{IdentityStore, MemoryIdentityStore};
use crate::auth::AuthService;

// ============================================================================
// Config structs (YAML deserialization targets)
// ============================================================================

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

/// Session and state signing configuration.
///
/// Access and refresh credentials are signed with distinct secrets so a
/// credential of one kind never verifies as the other.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret for access credentials
    pub access_secret: String,
    /// HS256 secret for refresh credentials (must differ from `access_secret`)
    pub refresh_secret: String,
    /// HMAC-SHA256 secret for the OAuth `state` parameter
    pub state_secret: String,
    /// Access credential lifetime in seconds (default: 900 = 15min)
    pub access_ttl_secs: u64,
    /// Refresh credential lifetime in seconds (default: 604800 = 7d)
    pub refresh_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            state_secret: String::new(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604800,
        }
    }
}

/// GitHub OAuth app configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Sent on authorize and token calls only when set
    pub redirect_uri: Option<String>,
    pub authorize_url: String,
    pub token_url: String,
    /// Base URL of the REST API (profile lives at `{api_url}/user`)
    pub api_url: String,
    pub scopes: String,
    /// Per-request deadline for provider calls
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: None,
            authorize_url: "https://github.com/login/oauth/authorize".into(),
            token_url: "https://github.com/login/oauth/access_token".into(),
            api_url: "https://api.github.com".into(),
            scopes: "read:user user:email".into(),
            timeout_secs: 10,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub github: GitHubConfig,
}

fn env_override(target: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var) {
        *target = value;
    }
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_yaml(yaml_path);

        if let Some(port) = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.server.port = port;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        env_override(&mut config.auth.access_secret, "JWT_ACCESS_SECRET");
        env_override(&mut config.auth.refresh_secret, "JWT_REFRESH_SECRET");
        env_override(&mut config.auth.state_secret, "OAUTH_STATE_SECRET");
        env_override(&mut config.github.client_id, "GITHUB_CLIENT_ID");
        env_override(&mut config.github.client_secret, "GITHUB_CLIENT_SECRET");
        if let Ok(uri) = std::env::var("GITHUB_REDIRECT_URI") {
            config.github.redirect_uri = Some(uri).filter(|u| !u.is_empty());
        }

        Ok(config)
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> Self {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<()> {
        let auth = &self.auth;
        for (name, value) in [
            ("auth.access_secret", &auth.access_secret),
            ("auth.refresh_secret", &auth.refresh_secret),
            ("auth.state_secret", &auth.state_secret),
            ("github.client_id", &self.github.client_id),
        ] {
            if value.is_empty() {
                bail!("{} is required", name);
            }
        }
        if auth.access_secret == auth.refresh_secret {
            bail!("auth.access_secret and auth.refresh_secret must differ");
        }
        if auth.access_ttl_secs == 0 || auth.refresh_ttl_secs == 0 {
            bail!("credential lifetimes must be greater than zero");
        }
        if self.github.timeout_secs == 0 {
            bail!("github.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

// ============================================================================
// Application state
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<TokenCodec>,
    pub store: Arc<dyn IdentityStore>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Validate the config and wire the GitHub client with an in-memory identity store.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let provider =
            Arc::new(GitHubClient::new(&config.github).context("Failed to build GitHub client")?);
        Ok(Self::with_components(
            config,
            provider,
            Arc::new(MemoryIdentityStore::new()),
        ))
    }

    /// Wire state around explicit provider and store implementations.
    pub fn with_components(
        config: Config,
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn IdentityStore>,
    ) -> Self {
        let tokens = Arc::new(TokenCodec::from_config(&config.auth));
        let auth = Arc::new(AuthService::from_config(
            &config,
            provider,
            store.clone(),
            tokens.clone(),
        ));

        Self {
            config: Arc::new(config),
            tokens,
            store,
            auth,
        }
    }
}

/// Bind the HTTP server and serve until Ctrl-C.
pub async fn start_server(config: Config) -> Result<()> {
    let port = config.server.port;
    let state = AppState::new(config)?;
    let app = api::create_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await
        .context("Server error")
}

// ============================================================================
// Tests
// ============================================================================
