//! Deploy Event Port
//!
//! Provides an observable interface for deploy runs.
//! Enables progress reporting, JSON event streams, and debugging.

use std::time::Duration;

use crate::domain::entities::{Host, Outcome, PipelineStage};
use crate::domain::services::DeployReport;

/// Event emitted during a deploy run
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Inventory resolved, hosts about to be deployed to
    HostsResolved {
        selector: String,
        hosts: Vec<Host>,
        /// Droplets dropped because they have no public IPv4
        skipped_ids: Vec<u64>,
    },

    /// A host's pipeline entered a stage
    StageStarted { host: Host, stage: PipelineStage },

    /// A pre/post-sync command finished (successfully or not)
    CommandFinished {
        host: Host,
        stage: PipelineStage,
        command: String,
        exit_code: Option<i32>,
        duration: Duration,
    },

    /// A host's pipeline reached a terminal stage
    HostFinished { outcome: Outcome },

    /// All host pipelines finished
    Completed { report: DeployReport },
}

/// Trait for receiving deploy events
///
/// Events arrive concurrently from every host worker.
///
/// Implementations can be:
/// - ConsoleEventSink: Progress lines in the terminal
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants per-stage and per-command events
    ///
    /// Some sinks may only want summary events.
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
