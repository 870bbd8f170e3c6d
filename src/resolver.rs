//! TURN credential resolution for call setup.
//!
//! Tiers, tried strictly in order:
//!
//! 1. the injected [`CredentialCache`], no I/O;
//! 2. each configured relay's `/turn-credentials` endpoint, in declared order;
//! 3. local HMAC synthesis from the shared TURN secret, if configured.
//!
//! When every tier is unavailable the result is `None` and the call proceeds
//! with STUN only. Failures never escape [`IceCredentialResolver::resolve`].

use futures_util::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use umbra_ice_core::clock::{Clock, SystemClock};
use umbra_ice_core::credential::{IceCredential, LocalGenerator};
use umbra_ice_core::ice::{IceServer, build_ice_servers};
use umbra_ice_core::relay::RelayEndpoint;

use crate::cache::CredentialCache;
use crate::config::IceConfig;
use crate::fetcher::RelayFetcher;
use crate::http::HttpClient;

type SharedResolution = Shared<BoxFuture<'static, Option<IceCredential>>>;

/// Resolution currently running past the cache, tagged with its id.
type InFlightSlot = Arc<Mutex<Option<(u64, SharedResolution)>>>;

pub struct IceCredentialResolver {
    inner: Arc<ResolverInner>,
    /// Joined by concurrent callers; emptied by the resolution task itself.
    in_flight: InFlightSlot,
    next_resolution_id: AtomicU64,
}

struct ResolverInner {
    relays: Vec<RelayEndpoint>,
    fetcher: RelayFetcher,
    generator: Option<LocalGenerator>,
    cache: Arc<CredentialCache>,
    clock: Arc<dyn Clock>,
    stun_urls: Vec<String>,
    turn_urls: Vec<String>,
}

impl IceCredentialResolver {
    pub fn new(
        config: IceConfig,
        http_client: Arc<dyn HttpClient>,
        cache: Arc<CredentialCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let generator = config.local_generator();
        let fetcher = RelayFetcher::new(http_client, clock.clone(), &config);

        Self {
            inner: Arc::new(ResolverInner {
                relays: config.relays,
                fetcher,
                generator,
                cache,
                clock,
                stun_urls: config.stun_urls,
                turn_urls: config.turn_urls,
            }),
            in_flight: Arc::new(Mutex::new(None)),
            next_resolution_id: AtomicU64::new(0),
        }
    }

    /// Resolver on the wall clock with a cache of its own.
    pub fn with_system_clock(config: IceConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(CredentialCache::new(clock.clone()));
        Self::new(config, http_client, cache, clock)
    }

    pub fn cache(&self) -> &Arc<CredentialCache> {
        &self.inner.cache
    }

    /// Returns usable TURN credentials, or `None` if no tier can supply them.
    pub async fn resolve(&self) -> Option<IceCredential> {
        if let Some(cached) = self.inner.cache.get().await {
            debug!("Using cached TURN credential {}", cached.username);
            return Some(cached);
        }

        let resolution = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some((_, pending)) => {
                    debug!("Joining in-flight TURN credential resolution");
                    pending.clone()
                }
                None => {
                    let id = self.next_resolution_id.fetch_add(1, Ordering::Relaxed);
                    let pending = self.spawn_resolution(id);
                    *slot = Some((id, pending.clone()));
                    pending
                }
            }
        };

        resolution.await
    }

    /// Runs the tier chain on its own task so it finishes, caches and leaves
    /// the slot even when every caller has given up waiting.
    fn spawn_resolution(&self, id: u64) -> SharedResolution {
        let inner = Arc::clone(&self.inner);
        let in_flight = Arc::clone(&self.in_flight);

        let task = tokio::spawn(async move {
            let result = inner.resolve_uncached().await;
            // The caller holds the slot lock until this resolution is stored.
            let mut slot = in_flight.lock().await;
            if slot.as_ref().is_some_and(|(current, _)| *current == id) {
                *slot = None;
            }
            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                warn!("TURN credential resolution task failed: {}", e);
                None
            })
        }
        .boxed()
        .shared()
    }

    /// Resolves credentials and builds the ICE server list for a call.
    pub async fn ice_servers(&self) -> Vec<IceServer> {
        let credential = self.resolve().await;
        build_ice_servers(
            &self.inner.stun_urls,
            &self.inner.turn_urls,
            credential.as_ref(),
        )
    }

    /// Forgets the cached credential, e.g. after a relay rejected it.
    pub async fn invalidate(&self) {
        debug!("Invalidating cached TURN credential");
        self.inner.cache.clear().await;
    }
}

impl ResolverInner {
    async fn resolve_uncached(&self) -> Option<IceCredential> {
        // Another resolution may have filled the cache since the caller checked.
        if let Some(cached) = self.cache.get().await {
            return Some(cached);
        }

        for endpoint in &self.relays {
            match self.fetcher.fetch(endpoint).await {
                Ok(credential) => {
                    info!(
                        "Got TURN credentials from relay {} (expires at {})",
                        endpoint.url(),
                        credential.expires_at
                    );
                    self.cache.set(credential.clone()).await;
                    return Some(credential);
                }
                Err(e) => {
                    warn!("TURN credential fetch from {} failed: {}", endpoint.url(), e);
                }
            }
        }

        match &self.generator {
            Some(generator) => match generator.generate(self.clock.now()) {
                Ok(credential) => {
                    info!(
                        "Generated local TURN credentials (expires at {})",
                        credential.expires_at
                    );
                    self.cache.set(credential.clone()).await;
                    return Some(credential);
                }
                Err(e) => warn!("Local TURN credential generation failed: {}", e),
            },
            None => debug!("No TURN secret configured, skipping local generation"),
        }

        warn!("No TURN credentials available, calls will be STUN-only");
        None
    }
}
