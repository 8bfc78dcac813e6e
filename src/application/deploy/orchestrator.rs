//! Sync Orchestrator
//!
//! Drives one pipeline per host:
//!
//! ```text
//! Connecting -> PreSync -> Syncing -> PostSync -> Done
//!      \            \          \           \
//!       +------------+----------+-----------+--> Failed
//! ```
//!
//! Pipelines run on scoped worker threads pulling hosts from a shared
//! cursor, so at most `concurrency` hosts are in flight. Each pipeline is its
//! own failure domain: a failed or panicking host never stops its siblings.
//! Outcomes fan
//! in over a channel and are put back into host order by the aggregator.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::domain::entities::{Host, HostError, Outcome, PipelineStage, StageTiming};
use crate::domain::ports::{
    ConnectParams, DeployEvent, DeployEventSink, HostConnector, HostSession, NoopEventSink,
    SessionError,
};
use crate::domain::services::{DeployReport, ResultAggregator};
use crate::domain::value_objects::Credential;

type StageFailure = (PipelineStage, HostError);

/// Runs the per-host deploy pipelines for a resolved host set
pub struct SyncOrchestrator<'a, C: HostConnector + ?Sized> {
    connector: &'a C,
    event_sink: Arc<dyn DeployEventSink>,
    cancel: CancellationToken,
    concurrency: usize,
}

impl<'a, C: HostConnector + ?Sized> SyncOrchestrator<'a, C> {
    pub fn new(connector: &'a C) -> Self {
        Self {
            connector,
            event_sink: Arc::new(NoopEventSink),
            cancel: CancellationToken::new(),
            concurrency: 0,
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn DeployEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Limit concurrent pipelines (0 = one per host)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Run every host's pipeline to a terminal stage and aggregate the outcomes
    pub fn run(&self, hosts: &[Host], credential: &Credential, config: &Config) -> DeployReport {
        let params = ConnectParams {
            user: &config.user,
            port: config.port(),
            credential,
            connect_timeout: config.connect_timeout,
            command_timeout: config.command_timeout,
        };

        let workers = if self.concurrency == 0 {
            hosts.len()
        } else {
            self.concurrency.min(hosts.len())
        };
        info!(
            hosts = hosts.len(),
            workers,
            credential = credential.kind(),
            "starting host pipelines"
        );

        let cursor = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<Outcome>();

        thread::scope(|scope| {
            let cursor = &cursor;
            for _ in 0..workers {
                let tx = tx.clone();
                scope.spawn(move || loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(host) = hosts.get(index) else {
                        break;
                    };
                    let outcome = self.run_host(host, &params, config);
                    if tx.send(outcome).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);

        let report = ResultAggregator::aggregate(hosts, rx.into_iter().collect());
        self.event_sink.on_event(DeployEvent::Completed {
            report: report.clone(),
        });
        report
    }

    fn run_host(&self, host: &Host, params: &ConnectParams<'_>, config: &Config) -> Outcome {
        let mut timings = Vec::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.drive(host, params, config, &mut timings)
        }))
        .unwrap_or_else(|payload| {
            // Timings are pushed when a stage returns, so the panicking stage
            // is the one after the last recorded
            let stage = timings
                .last()
                .map_or(PipelineStage::Connecting, |t| t.stage.next());
            let message = format!("pipeline panicked: {}", panic_message(payload.as_ref()));
            Err((stage, HostError::new(stage.failure_kind(), message)))
        });

        let outcome = match result {
            Ok(()) => {
                info!(host = %host, "deploy finished");
                Outcome::done(*host, timings)
            }
            Err((stage, error)) => {
                warn!(host = %host, %stage, error = %error, "deploy failed");
                Outcome::failed(*host, stage, error, timings)
            }
        };

        self.event_sink.on_event(DeployEvent::HostFinished {
            outcome: outcome.clone(),
        });
        outcome
    }

    fn drive(
        &self,
        host: &Host,
        params: &ConnectParams<'_>,
        config: &Config,
        timings: &mut Vec<StageTiming>,
    ) -> Result<(), StageFailure> {
        let mut session = self.stage(host, PipelineStage::Connecting, timings, || {
            self.connector
                .connect(host.address(), params, &self.cancel)
                .map_err(|e| host_error(PipelineStage::Connecting, e))
        })?;

        self.stage(host, PipelineStage::PreSync, timings, || {
            self.run_commands(host, PipelineStage::PreSync, &config.pre_sync, session.as_mut())
        })?;

        self.stage(host, PipelineStage::Syncing, timings, || {
            session
                .copy_tree(&config.source_path, &config.target_path, &self.cancel)
                .map_err(|e| host_error(PipelineStage::Syncing, e))
        })?;

        self.stage(host, PipelineStage::PostSync, timings, || {
            self.run_commands(host, PipelineStage::PostSync, &config.post_sync, session.as_mut())
        })?;

        Ok(())
    }

    /// Run one stage, recording its duration. Cancellation is checked on entry.
    fn stage<T>(
        &self,
        host: &Host,
        stage: PipelineStage,
        timings: &mut Vec<StageTiming>,
        body: impl FnOnce() -> Result<T, HostError>,
    ) -> Result<T, StageFailure> {
        if self.cancel.is_cancelled() {
            return Err((stage, HostError::cancelled()));
        }

        debug!(host = %host, %stage, "stage started");
        if self.event_sink.wants_detailed_events() {
            self.event_sink.on_event(DeployEvent::StageStarted { host: *host, stage });
        }

        let started = Instant::now();
        let result = body();
        timings.push(StageTiming {
            stage,
            duration: started.elapsed(),
        });
        result.map_err(|error| (stage, error))
    }

    /// Run commands in order; the first failure stops the stage.
    fn run_commands(
        &self,
        host: &Host,
        stage: PipelineStage,
        commands: &[String],
        session: &mut dyn HostSession,
    ) -> Result<(), HostError> {
        for command in commands {
            if self.cancel.is_cancelled() {
                return Err(HostError::cancelled().with_command(command));
            }

            let started = Instant::now();
            let output = session
                .run_command(command, &self.cancel)
                .map_err(|e| host_error(stage, e).with_command(command))?;
            debug!(host = %host, %stage, command = %command, exit_code = ?output.exit_code, "command finished");

            if self.event_sink.wants_detailed_events() {
                self.event_sink.on_event(DeployEvent::CommandFinished {
                    host: *host,
                    stage,
                    command: command.clone(),
                    exit_code: output.exit_code,
                    duration: started.elapsed(),
                });
            }

            if !output.is_success() {
                let status = match output.exit_code {
                    Some(code) => format!("exit code {}", code),
                    None => "terminated by signal".to_string(),
                };
                let diagnostic = output.diagnostic();
                let message = if diagnostic.is_empty() {
                    status
                } else {
                    format!("{}: {}", status, diagnostic)
                };
                return Err(HostError::new(stage.failure_kind(), message).with_command(command));
            }
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn host_error(stage: PipelineStage, error: SessionError) -> HostError {
    match error {
        SessionError::Cancelled => HostError::cancelled(),
        other => HostError::new(stage.failure_kind(), other.to_string()),
    }
}
