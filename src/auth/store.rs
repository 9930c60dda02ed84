//! Identity store interface and an in-memory implementation.
//!
//! Reconciliation is an upsert keyed by the provider's external id: the first
//! login for an external id creates a record with a fresh local id, every
//! later login updates the mutable fields in place and keeps the id.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::auth::error::{AuthError, Result};
use crate::auth::models::{LocalIdentity, ProviderProfile};

/// Persistence of local identities.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create or update the identity for `profile.external_id`.
    ///
    /// Never creates a second record for an external id already present.
    async fn upsert(
        &self,
        profile: &ProviderProfile,
        provider_access_token: &str,
        provider_refresh_token: Option<&str>,
    ) -> Result<LocalIdentity>;

    /// Fetch an identity by local id. Fails with [`AuthError::NotFound`] if absent.
    async fn get_by_id(&self, id: i64) -> Result<LocalIdentity>;
}

#[derive(Default)]
struct Tables {
    by_id: HashMap<i64, LocalIdentity>,
    by_external_id: HashMap<i64, i64>,
    last_id: i64,
}

/// In-memory identity store backed by `tokio::sync::RwLock<HashMap<..>>`.
#[derive(Default)]
pub struct MemoryIdentityStore {
    tables: RwLock<Tables>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored identities.
    pub async fn len(&self) -> usize {
        self.tables.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Empty optional fields are stored as absent.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn upsert(
        &self,
        profile: &ProviderProfile,
        provider_access_token: &str,
        provider_refresh_token: Option<&str>,
    ) -> Result<LocalIdentity> {
        let mut tables = self.tables.write().await;

        let id = match tables.by_external_id.get(&profile.external_id) {
            Some(id) => *id,
            None => {
                tables.last_id += 1;
                let id = tables.last_id;
                tables.by_external_id.insert(profile.external_id, id);
                id
            }
        };

        let identity = LocalIdentity {
            id,
            external_id: profile.external_id,
            login_name: profile.login_name.clone(),
            email: non_empty(profile.email.as_deref()),
            avatar_url: profile.avatar_url.clone(),
            provider_access_token: provider_access_token.to_string(),
            provider_refresh_token: non_empty(provider_refresh_token),
        };
        tables.by_id.insert(id, identity.clone());

        Ok(identity)
    }

    async fn get_by_id(&self, id: i64) -> Result<LocalIdentity> {
        self.tables
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(AuthError::NotFound)
    }
}

// ============================================================================
// Tests
// ============================================================================
