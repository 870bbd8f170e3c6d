//! Runtime-agnostic pieces of TURN credential resolution: the credential
//! type, its HMAC synthesis, the relay endpoint protocol and the ICE server
//! list. Nothing in here performs I/O or depends on an async runtime.

pub mod clock;
pub mod credential;
pub mod ice;
pub mod net;
pub mod relay;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{
    CredentialError, IceCredential, LocalGenerator, generate_credential, verify_credential,
};
pub use ice::{IceServer, build_ice_servers};
pub use relay::{RelayEndpoint, RelayError, parse_credential_response};
