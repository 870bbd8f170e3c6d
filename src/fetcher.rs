//! Fetches server-issued TURN credentials from relay HTTP endpoints.

use log::debug;
use std::sync::Arc;
use std::time::Duration;
use umbra_ice_core::clock::Clock;
use umbra_ice_core::credential::IceCredential;
use umbra_ice_core::relay::{RelayEndpoint, parse_credential_response};

use crate::error::RelayFetchError;
use crate::config::IceConfig;
use crate::http::{HttpClient, HttpRequest};

/// Bytes of an unexpected response body kept in log lines.
const LOGGED_BODY_LIMIT: usize = 256;

pub struct RelayFetcher {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    default_ttl_secs: u64,
    allow_plaintext: bool,
}

impl RelayFetcher {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
        config: &IceConfig,
    ) -> Self {
        Self {
            http_client,
            clock,
            timeout: config.fetch_timeout,
            default_ttl_secs: config.default_relay_ttl_secs,
            allow_plaintext: config.allow_plaintext_relays,
        }
    }

    /// Asks one relay for credentials. Every failure mode, the timeout
    /// included, comes back as a [`RelayFetchError`].
    pub async fn fetch(&self, endpoint: &RelayEndpoint) -> Result<IceCredential, RelayFetchError> {
        let url = endpoint.credentials_url(self.allow_plaintext)?;
        debug!("Requesting TURN credentials from {}", url);

        let request = HttpRequest::get(&url)
            .with_header("Accept", "application/json")
            .with_timeout(self.timeout);

        let response = tokio::time::timeout(self.timeout, self.http_client.execute(request))
            .await
            .map_err(|_| RelayFetchError::Timeout(self.timeout))?
            .map_err(|e| RelayFetchError::Transport(format!("{e:#}")))?;

        if !response.is_ok() {
            debug!(
                "Relay {} answered {} body={}",
                url,
                response.status_code,
                response.body_preview(LOGGED_BODY_LIMIT)
            );
        }

        let credential = parse_credential_response(
            response.status_code,
            &response.body,
            self.clock.now(),
            self.default_ttl_secs,
        )?;
        Ok(credential)
    }
}
