use std::time::Duration;
use umbra_ice_core::credential::{LOCAL_CREDENTIAL_TTL_SECS, LocalGenerator};
use umbra_ice_core::ice::DEFAULT_STUN_SERVERS;
use umbra_ice_core::relay::RelayEndpoint;

/// Upper bound for a single relay credential request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct IceConfig {
    /// Relay signaling URLs, in fallback order.
    pub relays: Vec<RelayEndpoint>,
    /// Shared TURN secret for local credential generation.
    pub turn_secret: Option<String>,
    /// URLs of the TURN entry in the ICE server list.
    pub turn_urls: Vec<String>,
    pub stun_urls: Vec<String>,
    pub fetch_timeout: Duration,
    pub local_ttl_secs: u64,
    /// Lifetime assumed when a relay answers without `ttl`.
    pub default_relay_ttl_secs: u64,
    /// Lets `ws://`/`http://` relays be queried over plain HTTP. Development only.
    pub allow_plaintext_relays: bool,
}

impl Default for IceConfig {
    fn default() -> Self {
        Self {
            relays: Vec::new(),
            turn_secret: None,
            turn_urls: Vec::new(),
            stun_urls: DEFAULT_STUN_SERVERS.iter().map(|s| s.to_string()).collect(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            local_ttl_secs: LOCAL_CREDENTIAL_TTL_SECS,
            default_relay_ttl_secs: LOCAL_CREDENTIAL_TTL_SECS,
            allow_plaintext_relays: false,
        }
    }
}

impl IceConfig {
    pub fn with_relay(mut self, url: impl Into<RelayEndpoint>) -> Self {
        self.relays.push(url.into());
        self
    }

    pub fn with_relays<I, U>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<RelayEndpoint>,
    {
        self.relays.extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn with_turn_secret(mut self, secret: impl Into<String>) -> Self {
        self.turn_secret = Some(secret.into());
        self
    }

    pub fn with_turn_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.turn_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stun_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stun_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_local_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.local_ttl_secs = ttl_secs;
        self
    }

    pub fn with_plaintext_relays(mut self, allow: bool) -> Self {
        self.allow_plaintext_relays = allow;
        self
    }

    /// An empty secret counts as not configured.
    pub fn local_generator(&self) -> Option<LocalGenerator> {
        self.turn_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(|secret| LocalGenerator::new(secret, self.local_ttl_secs))
    }
}

impl std::fmt::Debug for IceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IceConfig")
            .field("relays", &self.relays)
            .field(
                "turn_secret",
                &self.turn_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("turn_urls", &self.turn_urls)
            .field("stun_urls", &self.stun_urls)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("local_ttl_secs", &self.local_ttl_secs)
            .field("default_relay_ttl_secs", &self.default_relay_ttl_secs)
            .field("allow_plaintext_relays", &self.allow_plaintext_relays)
            .finish()
    }
}
