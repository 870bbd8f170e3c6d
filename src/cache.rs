//! Single-slot cache for the most recently resolved TURN credential.

use chrono::Duration;
use log::debug;
use std::sync::Arc;
use tokio::sync::RwLock;
use umbra_ice_core::clock::Clock;
use umbra_ice_core::credential::IceCredential;

/// A cached credential is only handed out while it has more than this much
/// lifetime left, so a call set up from it cannot outlive it mid-session.
pub const SAFETY_MARGIN_SECS: i64 = 60 * 60;

/// Holds at most one credential. Stale entries are dropped on read.
pub struct CredentialCache {
    slot: RwLock<Option<IceCredential>>,
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
}

impl CredentialCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            clock,
            safety_margin: Duration::seconds(SAFETY_MARGIN_SECS),
        }
    }

    /// Returns the cached credential if it is still outside the safety margin.
    pub async fn get(&self) -> Option<IceCredential> {
        {
            let guard = self.slot.read().await;
            match &*guard {
                None => return None,
                Some(credential) if self.is_fresh(credential) => {
                    return Some(credential.clone());
                }
                Some(_) => {}
            }
        }

        let mut guard = self.slot.write().await;
        // A writer may have replaced the stale entry while we waited.
        if let Some(credential) = &*guard
            && self.is_fresh(credential)
        {
            return Some(credential.clone());
        }
        if let Some(stale) = guard.take() {
            debug!(
                "Discarding cached TURN credential {} (expires at {})",
                stale.username, stale.expires_at
            );
        }
        None
    }

    /// Replaces the slot. A credential already inside the safety margin is
    /// stored but will never be returned by [`get`](Self::get).
    pub async fn set(&self, credential: IceCredential) {
        debug!(
            "Caching TURN credential {} until {}",
            credential.username, credential.expires_at
        );
        *self.slot.write().await = Some(credential);
    }

    pub async fn clear(&self) {
        self.slot.write().await.take();
    }

    fn is_fresh(&self, credential: &IceCredential) -> bool {
        credential.remaining(self.clock.now()) > self.safety_margin
    }
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("safety_margin", &self.safety_margin)
            .finish_non_exhaustive()
    }
}
