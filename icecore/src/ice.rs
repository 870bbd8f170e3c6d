//! ICE server list handed to the WebRTC layer.

use crate::credential::IceCredential;
use serde::{Deserialize, Serialize};

/// Public STUN servers offered on every call.
pub const DEFAULT_STUN_SERVERS: &[&str] = &[
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];

/// One entry of an `RTCConfiguration.iceServers` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServer {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn turn(urls: Vec<String>, credential: &IceCredential) -> Self {
        Self {
            urls,
            username: Some(credential.username.clone()),
            credential: Some(credential.credential.clone()),
        }
    }

    pub fn is_turn(&self) -> bool {
        self.username.is_some()
    }
}

/// STUN servers first, then a single TURN entry when a credential is known.
///
/// Without a credential (or without TURN URLs) the call runs STUN-only.
pub fn build_ice_servers(
    stun_urls: &[String],
    turn_urls: &[String],
    credential: Option<&IceCredential>,
) -> Vec<IceServer> {
    let mut servers: Vec<IceServer> = stun_urls.iter().map(IceServer::stun).collect();

    if let Some(credential) = credential
        && !turn_urls.is_empty()
    {
        servers.push(IceServer::turn(turn_urls.to_vec(), credential));
    }

    servers
}
