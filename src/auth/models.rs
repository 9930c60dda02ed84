//! Identity records exchanged between the provider client, the store and callers.

use serde::{Deserialize, Serialize};

/// Profile returned by the identity provider for the authenticated account.
///
/// Never persisted directly: it always goes through
/// [`IdentityStore::upsert`](crate::auth::store::IdentityStore::upsert).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderProfile {
    /// Provider-assigned, immutable account id
    #[serde(rename = "id")]
    pub external_id: i64,
    #[serde(rename = "login")]
    pub login_name: String,
    /// GitHub returns `null` when the user keeps their address private
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
}

/// Locally reconciled identity, owned by the identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    /// Local primary key, assigned on first reconciliation
    pub id: i64,
    /// Unique, one-to-one with [`ProviderProfile::external_id`]
    pub external_id: i64,
    pub login_name: String,
    pub email: Option<String>,
    pub avatar_url: String,
    /// Stored for downstream provider calls on the user's behalf
    pub provider_access_token: String,
    pub provider_refresh_token: Option<String>,
}

/// Public view of an identity (safe to send to clients, carries no provider tokens).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub external_id: i64,
    pub login_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar_url: String,
}

impl From<&LocalIdentity> for UserResponse {
    fn from(identity: &LocalIdentity) -> Self {
        Self {
            id: identity.id,
            external_id: identity.external_id,
            login_name: identity.login_name.clone(),
            email: identity.email.clone(),
            avatar_url: identity.avatar_url.clone(),
        }
    }
}

impl From<LocalIdentity> for UserResponse {
    fn from(identity: LocalIdentity) -> Self {
        Self {
            id: identity.id,
            external_id: identity.external_id,
            login_name: identity.login_name,
            email: identity.email,
            avatar_url: identity.avatar_url,
        }
    }
}

/// Access + refresh credential pair handed out after a completed login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access credential
    pub expires_in_seconds: u64,
}
