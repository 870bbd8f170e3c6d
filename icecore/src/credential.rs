//! TURN credentials and their local synthesis.
//!
//! Locally generated credentials follow the TURN REST API convention used by
//! coturn's `use-auth-secret` mode:
//!
//! - username = `"<unix expiry seconds>:<label>"`
//! - credential = base64(HMAC-SHA1(shared secret, username))
//!
//! A relay holding the same secret re-derives the MAC from the presented
//! username, so no handshake with the relay is needed beforehand.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use thiserror::Error;

/// Label appended to every username after the expiry timestamp.
pub const CREDENTIAL_LABEL: &str = "umbra";

/// Lifetime of locally generated credentials.
pub const LOCAL_CREDENTIAL_TTL_SECS: u64 = 24 * 60 * 60;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential ttl must be positive")]
    NonPositiveTtl,

    #[error("credential ttl {0}s is out of range")]
    TtlOutOfRange(u64),

    #[error("invalid hmac key")]
    InvalidKey,

    #[error("malformed username: {0}")]
    MalformedUsername(String),

    #[error("credential expired at {0}")]
    Expired(i64),

    #[error("credential is not valid base64")]
    InvalidEncoding,

    #[error("credential does not match username")]
    Mismatch,
}

/// A TURN username/credential pair and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCredential {
    pub username: String,
    pub credential: String,
    pub expires_at: DateTime<Utc>,
}

impl IceCredential {
    /// Time left until expiry, negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at.signed_duration_since(now)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Computes a credential that expires `ttl_secs` after `now`.
///
/// Pure: the same inputs always produce the same credential.
pub fn generate_credential(
    secret: &[u8],
    ttl_secs: u64,
    now: DateTime<Utc>,
) -> Result<IceCredential, CredentialError> {
    if ttl_secs == 0 {
        return Err(CredentialError::NonPositiveTtl);
    }
    let ttl = i64::try_from(ttl_secs).map_err(|_| CredentialError::TtlOutOfRange(ttl_secs))?;
    let expiry = now
        .timestamp()
        .checked_add(ttl)
        .ok_or(CredentialError::TtlOutOfRange(ttl_secs))?;
    let expires_at =
        DateTime::from_timestamp(expiry, 0).ok_or(CredentialError::TtlOutOfRange(ttl_secs))?;

    let username = format!("{expiry}:{CREDENTIAL_LABEL}");
    let credential = STANDARD.encode(sign(secret, &username)?);

    Ok(IceCredential {
        username,
        credential,
        expires_at,
    })
}

/// Relay-side check of a presented username/credential pair.
///
/// The MAC comparison is constant time.
pub fn verify_credential(
    secret: &[u8],
    username: &str,
    credential: &str,
    now: DateTime<Utc>,
) -> Result<(), CredentialError> {
    let expiry = parse_username_expiry(username)?;
    if expiry <= now.timestamp() {
        return Err(CredentialError::Expired(expiry));
    }

    let presented = STANDARD
        .decode(credential)
        .map_err(|_| CredentialError::InvalidEncoding)?;

    let mut mac = HmacSha1::new_from_slice(secret).map_err(|_| CredentialError::InvalidKey)?;
    mac.update(username.as_bytes());
    mac.verify_slice(&presented)
        .map_err(|_| CredentialError::Mismatch)
}

/// Extracts the Unix expiry from a `"<expiry>:<label>"` username.
pub fn parse_username_expiry(username: &str) -> Result<i64, CredentialError> {
    let (expiry, label) = username
        .split_once(':')
        .ok_or_else(|| CredentialError::MalformedUsername(username.to_string()))?;
    if label.is_empty() {
        return Err(CredentialError::MalformedUsername(username.to_string()));
    }
    expiry
        .parse::<i64>()
        .map_err(|_| CredentialError::MalformedUsername(username.to_string()))
}

fn sign(secret: &[u8], username: &str) -> Result<Vec<u8>, CredentialError> {
    let mut mac = HmacSha1::new_from_slice(secret).map_err(|_| CredentialError::InvalidKey)?;
    mac.update(username.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Shared-secret credential source with a fixed lifetime.
#[derive(Clone)]
pub struct LocalGenerator {
    secret: Vec<u8>,
    ttl_secs: u64,
}

impl LocalGenerator {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn generate(&self, now: DateTime<Utc>) -> Result<IceCredential, CredentialError> {
        generate_credential(&self.secret, self.ttl_secs, now)
    }
}

impl std::fmt::Debug for LocalGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalGenerator")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}
