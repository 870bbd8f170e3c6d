//! HTTP seam used by the relay fetcher.
//!
//! The trait lives in `umbra-ice-core` so client crates can implement it
//! without depending on this runtime crate.

pub use umbra_ice_core::net::{HttpClient, HttpRequest, HttpResponse};
