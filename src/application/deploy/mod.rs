//! Deploy Module
//!
//! Orchestrates a deploy run.
//!
//! ## Structure
//!
//! - `options` - Run options (`DeployOptions`)
//! - `orchestrator` - Per-host pipelines and their fan-out (`SyncOrchestrator`)
//! - `use_case` - Setup checks and wiring (`DeployUseCase`, `DeployPlan`)
//!
//! ## Usage
//!
//! ```ignore
//! use drone_digitalocean::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let use_case = DeployUseCase::new(&inventory, &connector)
//!     .with_event_sink(events)
//!     .with_cancellation(cancel);
//! let report = use_case.execute(&mut config, &DeployOptions::new())?;
//! ```

mod options;
mod orchestrator;
mod use_case;

pub use options::DeployOptions;
pub use orchestrator::SyncOrchestrator;
pub use use_case::{DeployPlan, DeployUseCase};
