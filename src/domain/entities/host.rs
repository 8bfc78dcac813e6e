//! Host Entity

use std::fmt;
use std::net::Ipv4Addr;

/// A droplet reduced to what a deploy needs: its cloud ID and public IPv4
///
/// Hosts are produced by the inventory resolver and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Host {
    id: u64,
    address: Ipv4Addr,
}

impl Host {
    pub fn new(id: u64, address: Ipv4Addr) -> Self {
        Self { id, address }
    }

    /// Opaque cloud identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.address)
    }
}
