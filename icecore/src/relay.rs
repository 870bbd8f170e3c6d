//! Relay credential endpoint protocol.
//!
//! Each relay exposes its signaling websocket at something like
//! `wss://relay.umbra.app/ws` and serves TURN credentials next to it:
//!
//! ```text
//! GET https://relay.umbra.app/turn-credentials
//! 200 OK
//! { "username": "1700086400:umbra", "credential": "...", "ttl": 86400 }
//! ```
//!
//! This module only derives URLs and validates responses; the request itself
//! is issued by the runtime crate.

use crate::credential::IceCredential;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Path of the credential endpoint on every relay.
pub const TURN_CREDENTIALS_PATH: &str = "/turn-credentials";

/// Trailing path segment of the signaling websocket, replaced when deriving
/// the credential endpoint.
const SIGNALING_PATH_SEGMENT: &str = "/ws";

#[derive(Debug, Error, PartialEq)]
pub enum RelayError {
    #[error("invalid relay url: {0}")]
    InvalidEndpoint(String),

    #[error("plaintext relay url not allowed: {0}")]
    PlaintextEndpoint(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed credential response: {0}")]
    Malformed(String),

    #[error("credential response is missing `{0}`")]
    MissingField(&'static str),

    #[error("unusable ttl {0}")]
    UnusableTtl(f64),
}

/// One relay, identified by its signaling URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelayEndpoint {
    url: String,
}

impl RelayEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Derives the HTTPS credential endpoint from the signaling URL.
    ///
    /// `wss` maps to `https`, a trailing `/ws` segment is dropped and
    /// `/turn-credentials` is appended. Query and fragment are discarded.
    /// `ws`/`http` relays map to `http` only when `allow_plaintext` is set,
    /// which is meant for local development relays.
    pub fn credentials_url(&self, allow_plaintext: bool) -> Result<String, RelayError> {
        let invalid = || RelayError::InvalidEndpoint(self.url.clone());

        let (scheme, rest) = self.url.trim().split_once("://").ok_or_else(invalid)?;
        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "wss" | "https" => "https",
            "ws" | "http" if allow_plaintext => "http",
            "ws" | "http" => return Err(RelayError::PlaintextEndpoint(self.url.clone())),
            _ => return Err(invalid()),
        };

        let rest = rest.split(['?', '#']).next().unwrap_or("");
        let (authority, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(invalid());
        }

        let path = path.trim_end_matches('/');
        let prefix = path.strip_suffix(SIGNALING_PATH_SEGMENT).unwrap_or(path);

        Ok(format!(
            "{scheme}://{authority}{prefix}{TURN_CREDENTIALS_PATH}"
        ))
    }
}

impl From<&str> for RelayEndpoint {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for RelayEndpoint {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

#[derive(Deserialize)]
struct RawTurnCredentials {
    username: Option<String>,
    credential: Option<String>,
    ttl: Option<f64>,
}

/// Validates a relay answer and turns it into a credential.
///
/// `default_ttl_secs` applies when the relay omits `ttl`. A `ttl` that is
/// zero, negative or not finite means the credential is already dead.
pub fn parse_credential_response(
    status_code: u16,
    body: &[u8],
    now: DateTime<Utc>,
    default_ttl_secs: u64,
) -> Result<IceCredential, RelayError> {
    if status_code != 200 {
        return Err(RelayError::Status(status_code));
    }

    let raw: RawTurnCredentials =
        serde_json::from_slice(body).map_err(|e| RelayError::Malformed(e.to_string()))?;

    let username = raw
        .username
        .filter(|u| !u.is_empty())
        .ok_or(RelayError::MissingField("username"))?;
    let credential = raw
        .credential
        .filter(|c| !c.is_empty())
        .ok_or(RelayError::MissingField("credential"))?;

    let ttl = raw.ttl.unwrap_or(default_ttl_secs as f64);
    if !ttl.is_finite() || ttl <= 0.0 {
        return Err(RelayError::UnusableTtl(ttl));
    }

    // Float to int casts saturate, the checked arithmetic below catches the rest.
    let ttl_millis = (ttl * 1000.0) as i64;
    let expires_at = Duration::try_milliseconds(ttl_millis)
        .and_then(|d| now.checked_add_signed(d))
        .filter(|at| *at > now)
        .ok_or(RelayError::UnusableTtl(ttl))?;

    Ok(IceCredential {
        username,
        credential,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_credentials_url_from_signaling_url() {
        let cases = [
            ("wss://relay.umbra.app/ws", "https://relay.umbra.app/turn-credentials"),
            ("wss://relay.umbra.app/ws/", "https://relay.umbra.app/turn-credentials"),
            ("wss://relay.umbra.app", "https://relay.umbra.app/turn-credentials"),
            ("WSS://relay.umbra.app/ws?token=abc", "https://relay.umbra.app/turn-credentials"),
            ("wss://eu.umbra.app/relay/ws", "https://eu.umbra.app/relay/turn-credentials"),
            ("https://relay.umbra.app", "https://relay.umbra.app/turn-credentials"),
        ];
        for (input, expected) in cases {
            assert_eq!(
                RelayEndpoint::new(input).credentials_url(false).as_deref(),
                Ok(expected),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_plaintext_relay_needs_opt_in() {
        for input in ["ws://localhost:8080/ws", "http://localhost:8080"] {
            assert_eq!(
                RelayEndpoint::new(input).credentials_url(false),
                Err(RelayError::PlaintextEndpoint(input.to_string()))
            );
            assert_eq!(
                RelayEndpoint::new(input).credentials_url(true).as_deref(),
                Ok("http://localhost:8080/turn-credentials")
            );
        }
    }

    #[test]
    fn test_credentials_url_rejects_bad_input() {
        for input in ["relay.umbra.app/ws", "ftp://relay.umbra.app", "wss:///ws", ""] {
            assert!(
                matches!(
                    RelayEndpoint::new(input).credentials_url(true),
                    Err(RelayError::InvalidEndpoint(_))
                ),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_parse_valid_response() {
        let body = br#"{"username":"1700086400:umbra","credential":"abc=","ttl":86400}"#;
        let cred = parse_credential_response(200, body, now(), 3600).unwrap();
        assert_eq!(cred.username, "1700086400:umbra");
        assert_eq!(cred.credential, "abc=");
        assert_eq!(cred.expires_at, now() + Duration::seconds(86400));
    }

    #[test]
    fn test_parse_missing_ttl_uses_default() {
        let body = br#"{"username":"u","credential":"c"}"#;
        let cred = parse_credential_response(200, body, now(), 3600).unwrap();
        assert_eq!(cred.expires_at, now() + Duration::hours(1));
    }

    #[test]
    fn test_parse_fractional_ttl() {
        let body = br#"{"username":"u","credential":"c","ttl":1.5}"#;
        let cred = parse_credential_response(200, body, now(), 3600).unwrap();
        assert_eq!(cred.expires_at, now() + Duration::milliseconds(1500));
    }

    #[test]
    fn test_parse_non_positive_ttl_rejected() {
        for body in [
            &br#"{"username":"u","credential":"c","ttl":0}"#[..],
            &br#"{"username":"u","credential":"c","ttl":-30}"#[..],
        ] {
            assert!(matches!(
                parse_credential_response(200, body, now(), 3600),
                Err(RelayError::UnusableTtl(_))
            ));
        }
    }

    #[test]
    fn test_parse_rejects_non_200() {
        let body = br#"{"username":"u","credential":"c"}"#;
        assert_eq!(
            parse_credential_response(503, body, now(), 3600),
            Err(RelayError::Status(503))
        );
        assert_eq!(
            parse_credential_response(201, body, now(), 3600),
            Err(RelayError::Status(201))
        );
    }

    #[test]
    fn test_parse_rejects_missing_or_empty_fields() {
        assert_eq!(
            parse_credential_response(200, br#"{"credential":"c"}"#, now(), 3600),
            Err(RelayError::MissingField("username"))
        );
        assert_eq!(
            parse_credential_response(200, br#"{"username":"u","credential":""}"#, now(), 3600),
            Err(RelayError::MissingField("credential"))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_credential_response(200, b"<html>gateway</html>", now(), 3600),
            Err(RelayError::Malformed(_))
        ));
        let body = br#"{"username":"u","credential":"c","ttl":"soon"}"#;
        assert!(matches!(
            parse_credential_response(200, body, now(), 3600),
            Err(RelayError::Malformed(_))
        ));
    }
}
