//! Cloud Inventory Port
//!
//! Read-only view of the cloud provider: load balancers and droplets.
//! The resolver only consumes the record shapes below, so any provider
//! client (or a test double) can stand behind this trait.

use thiserror::Error;

/// Load balancer as seen by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerRecord {
    pub name: String,
    /// IDs of the droplets behind this load balancer
    pub droplet_ids: Vec<u64>,
}

/// Droplet as seen by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropletRecord {
    pub id: u64,
    /// Public IPv4 address, if the droplet has one
    pub public_ipv4: Option<String>,
}

impl DropletRecord {
    pub fn new(id: u64, public_ipv4: Option<&str>) -> Self {
        Self {
            id,
            public_ipv4: public_ipv4.map(str::to_string),
        }
    }
}

/// Error returned by a cloud query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    /// Request could not be sent or the connection failed
    #[error("request failed: {0}")]
    Http(String),

    /// The API answered with a non-success status
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Read-only listing of cloud resources
pub trait CloudInventory: Send + Sync {
    /// List all load balancers (no filter)
    fn list_load_balancers(&self) -> Result<Vec<LoadBalancerRecord>, CloudError>;

    /// List all droplets (no filter)
    fn list_droplets(&self) -> Result<Vec<DropletRecord>, CloudError>;

    /// List droplets carrying `tag`
    fn list_droplets_by_tag(&self, tag: &str) -> Result<Vec<DropletRecord>, CloudError>;
}
