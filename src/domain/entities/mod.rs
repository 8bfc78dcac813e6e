//! Domain Entities
//!
//! - `Host` - A resolved deployment target
//! - `Outcome` - The recorded result of one host's pipeline

mod host;
mod outcome;

pub use host::Host;
pub use outcome::{HostError, HostErrorKind, Outcome, PipelineStage, StageTiming};
