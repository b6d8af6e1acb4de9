//! Request fingerprints binding a session to the client that created it.
//!
//! A fingerprint is the SHA-256 digest of the client's IP address and its
//! `User-Agent` header. It is a replay deterrent, not a device identity: two
//! clients behind the same NAT with the same browser build collide.

use std::fmt;
use std::net::IpAddr;

use crate::hashing::sha256_hex;

/// Hex-encoded digest of a requester's transport origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derive the fingerprint for a request.
    ///
    /// Only the IP is used, never the ephemeral source port, so successive
    /// connections from the same client agree. Missing inputs contribute an
    /// empty string.
    pub fn derive(remote_ip: Option<IpAddr>, user_agent: Option<&str>) -> Self {
        let ip = remote_ip.map(|ip| ip.to_string()).unwrap_or_default();
        let agent = user_agent.unwrap_or_default();
        Self(sha256_hex(format!("{ip} {agent}").as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
