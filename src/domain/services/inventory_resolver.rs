//! Inventory resolution service
//!
//! Turns a host selector into the ordered set of hosts to deploy to by
//! reconciling the cloud's load balancer and droplet listings.
//!
//! Droplets without a public IPv4 are skipped rather than failing the run;
//! their IDs are reported back so the caller can warn about them. An empty
//! result is always an error: deploying to zero hosts must never look like
//! success.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use tracing::{debug, warn};

use crate::config::HostSelector;
use crate::domain::entities::Host;
use crate::domain::ports::{CloudInventory, DropletRecord};
use crate::error::InventoryError;

/// Hosts resolved for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInventory {
    /// Target hosts, in the order the cloud listed the droplets. Never empty.
    pub hosts: Vec<Host>,
    /// Selected droplets dropped for lacking a usable public IPv4
    pub skipped_ids: Vec<u64>,
}

/// Resolves a selector against a cloud inventory
pub struct InventoryResolver<'a, I: CloudInventory + ?Sized> {
    inventory: &'a I,
}

impl<'a, I: CloudInventory + ?Sized> InventoryResolver<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self { inventory }
    }

    pub fn resolve(&self, selector: HostSelector<'_>) -> Result<ResolvedInventory, InventoryError> {
        let resolved = match selector {
            HostSelector::LoadBalancer(name) => self.by_load_balancer(name)?,
            HostSelector::Tag(tag) => self.by_tag(tag)?,
        };

        if !resolved.skipped_ids.is_empty() {
            warn!(
                skipped = resolved.skipped_ids.len(),
                ids = ?resolved.skipped_ids,
                "droplets without a public IPv4 address were skipped"
            );
        }

        if resolved.hosts.is_empty() {
            return Err(InventoryError::NoHostsFound {
                selector: selector.to_string(),
            });
        }

        debug!(count = resolved.hosts.len(), %selector, "resolved hosts");
        Ok(resolved)
    }

    fn by_load_balancer(&self, name: &str) -> Result<ResolvedInventory, InventoryError> {
        let load_balancers = self.inventory.list_load_balancers()?;

        // First match wins; duplicate names are not an error.
        let members: HashSet<u64> = match load_balancers.iter().find(|lb| lb.name == name) {
            Some(lb) => lb.droplet_ids.iter().copied().collect(),
            None => {
                warn!(load_balancer = name, "load balancer not found");
                HashSet::new()
            }
        };

        let droplets = self.inventory.list_droplets()?;
        Ok(to_hosts(
            droplets.iter().filter(|droplet| members.contains(&droplet.id)),
        ))
    }

    fn by_tag(&self, tag: &str) -> Result<ResolvedInventory, InventoryError> {
        let droplets = self.inventory.list_droplets_by_tag(tag)?;
        Ok(to_hosts(droplets.iter()))
    }
}

/// Convert droplets to hosts, keeping listing order and dropping duplicate IDs
fn to_hosts<'d>(droplets: impl Iterator<Item = &'d DropletRecord>) -> ResolvedInventory {
    let mut seen = HashSet::new();
    let mut hosts = Vec::new();
    let mut skipped_ids = Vec::new();

    for droplet in droplets {
        if !seen.insert(droplet.id) {
            continue;
        }
        match public_ipv4(droplet) {
            Some(address) => hosts.push(Host::new(droplet.id, address)),
            None => skipped_ids.push(droplet.id),
        }
    }

    ResolvedInventory { hosts, skipped_ids }
}

fn public_ipv4(droplet: &DropletRecord) -> Option<Ipv4Addr> {
    let raw = droplet.public_ipv4.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(address) => Some(address),
        Err(_) => {
            warn!(droplet = droplet.id, address = raw, "ignoring malformed IPv4 address");
            None
        }
    }
}
