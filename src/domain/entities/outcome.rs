//! Per-host pipeline stages and outcomes

use std::fmt;
use std::time::Duration;

use super::Host;

/// One phase of a host's deployment
///
/// `Connecting` is the initial state; `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Connecting,
    PreSync,
    Syncing,
    PostSync,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::PreSync => "PreSync",
            Self::Syncing => "Syncing",
            Self::PostSync => "PostSync",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The stage that follows this one when it succeeds
    pub fn next(&self) -> Self {
        match self {
            Self::Connecting => Self::PreSync,
            Self::PreSync => Self::Syncing,
            Self::Syncing => Self::PostSync,
            Self::PostSync | Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    /// Error kind recorded when this stage fails
    pub fn failure_kind(&self) -> HostErrorKind {
        match self {
            Self::Connecting => HostErrorKind::Connection,
            Self::PreSync => HostErrorKind::PreSync,
            Self::Syncing => HostErrorKind::Sync,
            Self::PostSync | Self::Done | Self::Failed => HostErrorKind::PostSync,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure classification, scoped to a single host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostErrorKind {
    Connection,
    PreSync,
    Sync,
    PostSync,
    Cancelled,
}

impl HostErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "ConnectionError",
            Self::PreSync => "PreSyncError",
            Self::Sync => "SyncError",
            Self::PostSync => "PostSyncError",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for HostErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a host's pipeline failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub kind: HostErrorKind,
    pub message: String,
    /// The remote command that failed, for pre/post-sync failures
    pub command: Option<String>,
}

impl HostError {
    pub fn new(kind: HostErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            command: None,
        }
    }

    pub fn cancelled() -> Self {
        Self::new(HostErrorKind::Cancelled, "deploy cancelled")
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.command {
            Some(command) => write!(f, "{}: `{}`: {}", self.kind, command, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Wall-clock time spent in one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub duration: Duration,
}

/// Recorded result of one host's pipeline
///
/// Created once when the pipeline reaches a terminal stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    host: Host,
    final_stage: PipelineStage,
    failed_stage: Option<PipelineStage>,
    error: Option<HostError>,
    timings: Vec<StageTiming>,
}

impl Outcome {
    pub fn done(host: Host, timings: Vec<StageTiming>) -> Self {
        Self {
            host,
            final_stage: PipelineStage::Done,
            failed_stage: None,
            error: None,
            timings,
        }
    }

    /// A failed pipeline; `stage` is the stage that was running when it failed
    pub fn failed(
        host: Host,
        stage: PipelineStage,
        error: HostError,
        timings: Vec<StageTiming>,
    ) -> Self {
        Self {
            host,
            final_stage: PipelineStage::Failed,
            failed_stage: Some(stage),
            error: Some(error),
            timings,
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn final_stage(&self) -> PipelineStage {
        self.final_stage
    }

    pub fn failed_stage(&self) -> Option<PipelineStage> {
        self.failed_stage
    }

    pub fn error(&self) -> Option<&HostError> {
        self.error.as_ref()
    }

    pub fn timings(&self) -> &[StageTiming] {
        &self.timings
    }

    pub fn is_success(&self) -> bool {
        self.final_stage == PipelineStage::Done
    }

    pub fn total_duration(&self) -> Duration {
        self.timings.iter().map(|t| t.duration).sum()
    }
}
