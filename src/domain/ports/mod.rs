//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod cloud_inventory;
pub mod deploy_events;
pub mod host_session;

pub use cloud_inventory::{CloudError, CloudInventory, DropletRecord, LoadBalancerRecord};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use host_session::{CommandOutput, ConnectParams, HostConnector, HostSession, SessionError};
