//! Errors raised while resolving TURN credentials.
//!
//! None of these leave the resolver: each one marks a tier as unavailable.

use std::time::Duration;
use thiserror::Error;
use umbra_ice_core::relay::RelayError;

#[derive(Debug, Error)]
pub enum RelayFetchError {
    #[error("relay request failed: {0}")]
    Transport(String),

    #[error("relay did not answer within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Relay(#[from] RelayError),
}
