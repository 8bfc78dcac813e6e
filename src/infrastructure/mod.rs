//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `cloud/` - DigitalOcean API client (`CloudInventory`)
//! - `ssh/` - OpenSSH subprocess transport (`HostConnector`)
//! - `events/` - NDJSON event sink
//! - `recording` - In-memory `HostConnector` for tests and rehearsals

pub mod cloud;
pub mod events;
pub mod recording;
pub mod ssh;

// Re-export for convenience
pub use cloud::DigitalOceanClient;
pub use events::JsonEventSink;
pub use recording::{RecordedOp, RecordingConnector};
pub use ssh::OpenSshConnector;
