//! Error taxonomy for the login flow and session verification.

use thiserror::Error;

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors produced by the auth core.
///
/// The HTTP layer maps these onto status codes; see [`AuthError::is_client_fault`]
/// and [`AuthError::is_provider_fault`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// The callback arrived without an authorization code.
    #[error("missing authorization code")]
    MissingAuthorizationCode,

    /// The anti-CSRF state did not verify.
    #[error("invalid state")]
    InvalidState,

    /// The identity provider rejected a call or returned something unusable.
    #[error("provider error: {0}")]
    Provider(String),

    /// The identity provider did not answer within the configured deadline.
    #[error("provider request timed out")]
    ProviderTimeout,

    /// A session credential failed signature, decoding, or expiry checks.
    #[error("invalid credential")]
    InvalidCredential,

    /// No usable bearer credential on the request.
    #[error("unauthorized")]
    Unauthorized,

    /// Refused to sign a credential for an identity id of 0 or below.
    #[error("credential requested for a missing identity")]
    MissingIdentity,

    /// The identity store has no record for the requested id.
    #[error("identity not found")]
    NotFound,

    /// Opaque persistence failure.
    #[error("identity store error: {0:#}")]
    Store(anyhow::Error),

    /// Credential serialisation failure.
    #[error("token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Wraps a provider failure with the operation that produced it.
    pub fn provider(context: &str, detail: impl std::fmt::Display) -> Self {
        Self::Provider(format!("{}: {}", context, detail))
    }

    /// Maps a transport error, keeping deadline expiry distinguishable.
    pub fn from_transport(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ProviderTimeout
        } else {
            Self::provider(context, err)
        }
    }

    /// Errors caused by the caller's input (flow misuse).
    #[must_use]
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::MissingAuthorizationCode | Self::InvalidState)
    }

    /// Errors caused by the upstream identity provider.
    #[must_use]
    pub fn is_provider_fault(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::ProviderTimeout)
    }

    /// Errors that must surface as one generic "unauthorized" outcome.
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::InvalidCredential | Self::Unauthorized)
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err)
    }
}
