//! GitHub OAuth2 Authorization Code Flow
//!
//! Handles the server side of the GitHub login:
//! 1. Build the authorization URL (user redirects to GitHub)
//! 2. Exchange the authorization code for a provider access token
//! 3. Fetch the account profile from the GitHub API
//!
//! Each call is a single attempt; the client-wide timeout bounds how long a
//! call can block.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;

use crate::auth::error::{AuthError, Result};
use crate::auth::models::ProviderProfile;
use crate::GitHubConfig;

const GITHUB_JSON: &str = "application/vnd.github+json";

/// The two provider calls the login flow depends on.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Trade an authorization code for a provider access token.
    async fn exchange_code(&self, code: &str) -> Result<String>;

    /// Fetch the profile of the account owning `access_token`.
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile>;
}

/// Build the URL the user is redirected to in order to start the flow.
pub fn authorization_url(config: &GitHubConfig, state: &str) -> String {
    let mut url = format!(
        "{}?client_id={}",
        config.authorize_url,
        urlencoding::encode(&config.client_id)
    );
    if let Some(ref redirect_uri) = config.redirect_uri {
        url.push_str("&redirect_uri=");
        url.push_str(&urlencoding::encode(redirect_uri));
    }
    url.push_str("&scope=");
    url.push_str(&urlencoding::encode(&config.scopes));
    url.push_str("&state=");
    url.push_str(&urlencoding::encode(state));
    url
}

/// GitHub token endpoint response
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[allow(dead_code)]
    token_type: Option<String>,
    #[allow(dead_code)]
    scope: Option<String>,
    error: Option<String>,
}

/// GitHub OAuth client
pub struct GitHubClient {
    client_id: String,
    client_secret: String,
    redirect_uri: Option<String>,
    token_url: String,
    api_url: String,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client using the configured request timeout.
    pub fn new(config: &GitHubConfig) -> anyhow::Result<Self> {
        Self::with_timeout(config, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(config: &GitHubConfig, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("forge-auth/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            token_url: config.token_url.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl IdentityProvider for GitHubClient {
    async fn exchange_code(&self, code: &str) -> Result<String> {
        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
        ];
        if let Some(ref redirect_uri) = self.redirect_uri {
            form.push(("redirect_uri", redirect_uri.as_str()));
        }

        let response = self
            .http_client
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::from_transport("exchange code", e))?;

        if !response.status().is_success() {
            return Err(AuthError::provider(
                "exchange code",
                format!("unexpected status {} from token endpoint", response.status()),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::from_transport("decode token response", e))?;

        if let Some(error) = token.error.filter(|e| !e.is_empty()) {
            return Err(AuthError::provider("exchange code", error));
        }
        if token.access_token.is_empty() {
            return Err(AuthError::provider("exchange code", "empty access token"));
        }

        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile> {
        let response = self
            .http_client
            .get(format!("{}/user", self.api_url))
            .bearer_auth(access_token)
            .header(ACCEPT, GITHUB_JSON)
            .send()
            .await
            .map_err(|e| AuthError::from_transport("fetch profile", e))?;

        if !response.status().is_success() {
            return Err(AuthError::provider(
                "fetch profile",
                format!("unexpected status {} from user API", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::from_transport("decode profile", e))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_github_config;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GitHubClient {
        let mut config = test_github_config();
        config.token_url = format!("{}/login/oauth/access_token", server.uri());
        config.api_url = server.uri();
        GitHubClient::new(&config).unwrap()
    }

    #[test]
    fn test_authorization_url_contains_required_params() {
        let url = authorization_url(&test_github_config(), "123.abc");

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fgithub%2Fcallback"));
        assert!(url.contains("scope=read%3Auser%20user%3Aemail"));
        assert!(url.ends_with("&state=123.abc"));
    }

    #[test]
    fn test_authorization_url_without_redirect() {
        let mut config = test_github_config();
        config.redirect_uri = None;

        let url = authorization_url(&config, "s.1");
        assert!(!url.contains("redirect_uri"));
        assert!(url.contains("state=s.1"));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(header("accept", "application/json"))
            .and(body_string_contains("code=code123"))
            .and(body_string_contains("client_id=test-client-id"))
            .and(body_string_contains("client_secret=test-client-secret"))
            .and(body_string_contains("redirect_uri="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "gho_abc",
                "token_type": "bearer",
                "scope": "read:user,user:email"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server).await.exchange_code("code123").await.unwrap();
        assert_eq!(token, "gho_abc");
    }

    #[tokio::test]
    async fn test_exchange_code_omits_unset_redirect_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(|req: &Request| !String::from_utf8_lossy(&req.body).contains("redirect_uri"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "t"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut config = test_github_config();
        config.token_url = format!("{}/login/oauth/access_token", server.uri());
        config.redirect_uri = None;
        let client = GitHubClient::new(&config).unwrap();

        assert_eq!(client.exchange_code("c").await.unwrap(), "t");
    }

    #[tokio::test]
    async fn test_exchange_code_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).await.exchange_code("c").await.unwrap_err();
        assert!(matches!(err, AuthError::Provider(ref msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_exchange_code_error_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.exchange_code("c").await.unwrap_err();
        assert!(matches!(err, AuthError::Provider(ref msg) if msg.contains("bad_verification_code")));
    }

    #[tokio::test]
    async fn test_exchange_code_empty_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": ""})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.exchange_code("c").await.unwrap_err();
        assert!(err.is_provider_fault());
    }

    #[tokio::test]
    async fn test_exchange_code_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut config = test_github_config();
        config.token_url = format!("{}/login/oauth/access_token", server.uri());
        let client = GitHubClient::with_timeout(&config, Duration::from_millis(100)).unwrap();

        let err = client.exchange_code("c").await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderTimeout));
    }

    #[tokio::test]
    async fn test_fetch_profile_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer gho_abc"))
            .and(header("accept", GITHUB_JSON))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 99,
                "login": "octo",
                "email": "octo@example.com",
                "avatar_url": "http://avatar"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server).await.fetch_profile("gho_abc").await.unwrap();
        assert_eq!(profile.external_id, 99);
        assert_eq!(profile.login_name, "octo");
        assert_eq!(profile.email.as_deref(), Some("octo@example.com"));
        assert_eq!(profile.avatar_url, "http://avatar");
    }

    #[tokio::test]
    async fn test_fetch_profile_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Bad credentials"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_profile("expired").await.unwrap_err();
        assert!(matches!(err, AuthError::Provider(ref msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_fetch_profile_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_profile("t").await.unwrap_err();
        assert!(err.is_provider_fault());
    }
}
