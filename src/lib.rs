//! drone-digitalocean - deploy a file tree to DigitalOcean droplets
//!
//! Resolves a set of droplets by load balancer membership or by tag, then
//! drives one deploy pipeline per droplet (connect, pre-sync commands, tree
//! copy, post-sync commands) and aggregates the outcomes into one verdict.
//!
//! ## Layers
//!
//! - `domain` - Entities, ports and pure services
//! - `application` - The deploy use case and the per-host orchestrator
//! - `infrastructure` - DigitalOcean API client, OpenSSH transport, event sinks
//! - `presentation` - Console progress and report rendering
//! - `config` - Deployment parameters and their validation

pub mod application;
pub mod cancel;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{DeployOptions, DeployPlan, DeployUseCase, SyncOrchestrator};
pub use cancel::CancellationToken;
pub use config::{Config, HostSelector};
pub use domain::entities::{Host, HostError, HostErrorKind, Outcome, PipelineStage};
pub use domain::services::DeployReport;
pub use error::{ConfigError, DeployError, DeployResult, InventoryError};
