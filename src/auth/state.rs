//! Stateless anti-CSRF state for the authorization redirect.
//!
//! A state value is `<nonce>.<hex(HMAC-SHA256(secret, nonce))>`. It can be
//! verified without any server-side storage; there is no single-use registry
//! and no expiry, so a captured state stays valid for as long as the secret
//! does.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies OAuth `state` values with a server secret.
#[derive(Clone)]
pub struct StateSigner {
    secret: Vec<u8>,
}

impl StateSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self, nonce: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length");
        mac.update(nonce.as_bytes());
        mac
    }

    /// Returns `nonce + "." + hex(HMAC-SHA256(secret, nonce))`.
    pub fn sign(&self, nonce: &str) -> String {
        let signature = self.mac(nonce).finalize().into_bytes();
        format!("{}.{}", nonce, hex::encode(signature))
    }

    /// Checks a state produced by [`StateSigner::sign`].
    ///
    /// Splits on the last `.`; rejects an empty nonce, an empty signature,
    /// anything that is not lowercase hex, and any signature mismatch.
    pub fn verify(&self, state: &str) -> bool {
        let Some(idx) = state.rfind('.') else {
            return false;
        };
        if idx == 0 || idx >= state.len() - 1 {
            return false;
        }

        let (nonce, signature) = (&state[..idx], &state[idx + 1..]);
        if !signature
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };

        self.mac(nonce).verify_slice(&signature).is_ok()
    }
}

/// Nonce for a new authorization round trip: the timestamp in nanoseconds.
///
/// Only the signature carries tamper evidence; the nonce is not required to
/// be unpredictable.
pub fn timestamp_nonce(now: DateTime<Utc>) -> String {
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros())
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
