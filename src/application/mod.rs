//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - Validate config, resolve inventory, run every host pipeline
//! - `SyncOrchestrator` - Fan out the per-host pipelines and aggregate outcomes

pub mod deploy;

pub use deploy::{DeployOptions, DeployPlan, DeployUseCase, SyncOrchestrator};
