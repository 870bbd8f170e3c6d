// Core types are re-exported so callers only need this crate
pub use umbra_ice_core::{clock, credential, ice, relay};

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_utils;

pub use cache::CredentialCache;
pub use config::IceConfig;
pub use error::RelayFetchError;
pub use resolver::IceCredentialResolver;
pub use umbra_ice_core::{Clock, IceCredential, IceServer, ManualClock, RelayEndpoint, SystemClock};
