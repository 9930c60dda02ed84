//! Session credential encoding and decoding using HS256.
//!
//! Two credential kinds are issued after a completed login: a short-lived
//! access credential (sent as `Authorization: Bearer <token>` on every
//! request) and a long-lived refresh credential. Both carry the same claims
//! and differ only in lifetime and signing key, so one kind never verifies
//! as the other.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::error::{AuthError, Result};
use crate::auth::models::LocalIdentity;
use crate::AuthConfig;

/// Which of the two credential kinds to sign or verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Local identity id
    #[serde(rename = "uid")]
    pub identity_id: i64,
    /// Provider account id
    #[serde(rename = "gid")]
    pub external_id: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl SigningKey {
    fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }
}

/// Signs and parses access and refresh credentials.
///
/// Holds only immutable key material, so a single instance can be shared
/// across request handlers without locking.
pub struct TokenCodec {
    access: SigningKey,
    refresh: SigningKey,
}

impl TokenCodec {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Self {
        Self {
            access: SigningKey::new(access_secret, access_ttl_secs),
            refresh: SigningKey::new(refresh_secret, refresh_ttl_secs),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.access_secret,
            &config.refresh_secret,
            config.access_ttl_secs,
            config.refresh_ttl_secs,
        )
    }

    fn key(&self, kind: TokenKind) -> &SigningKey {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime of the given credential kind, in seconds.
    pub fn ttl_secs(&self, kind: TokenKind) -> u64 {
        self.key(kind).ttl_secs
    }

    /// Sign a credential of `kind` for `identity`, valid from `now` for the kind's TTL.
    ///
    /// Deterministic for identical inputs. Refuses identities with an id of 0 or below.
    pub fn issue(
        &self,
        kind: TokenKind,
        identity: &LocalIdentity,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if identity.id <= 0 {
            return Err(AuthError::MissingIdentity);
        }

        let key = self.key(kind);
        let iat = now.timestamp();
        let claims = SessionClaims {
            identity_id: identity.id,
            external_id: identity.external_id,
            iat,
            exp: iat.saturating_add(key.ttl_secs as i64),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)?)
    }

    /// Verify a credential of `kind` against the current clock.
    pub fn parse(&self, kind: TokenKind, token: &str) -> Result<SessionClaims> {
        self.parse_at(kind, token, Utc::now())
    }

    /// Verify a credential of `kind` as of `now`.
    ///
    /// Expiry is exact: the credential stops verifying at `exp`, with no leeway.
    pub fn parse_at(
        &self,
        kind: TokenKind,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims> {
        // Expiry is checked below against the injected clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<SessionClaims>(token, &self.key(kind).decoding, &validation)
            .map_err(|_| AuthError::InvalidCredential)?
            .claims;

        if now.timestamp() >= claims.exp || claims.iat > claims.exp || claims.identity_id <= 0 {
            return Err(AuthError::InvalidCredential);
        }

        Ok(claims)
    }
}

// ============================================================================
// Tests
// ============================================================================
