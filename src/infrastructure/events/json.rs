//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::domain::entities::{Host, Outcome};
use crate::domain::ports::{DeployEvent, DeployEventSink};
use crate::domain::services::DeployReport;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Serializes lines written by concurrent host workers
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Write one event line. `fields` are merged after `event` and `timestamp`.
    pub fn emit(&self, event: &str, fields: Value) {
        let mut line = Map::new();
        line.insert("event".to_string(), Value::from(event));
        line.insert(
            "timestamp".to_string(),
            Value::from(chrono::Utc::now().to_rfc3339()),
        );
        if let Value::Object(fields) = fields {
            line.extend(fields);
        }

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", Value::Object(line));
            let _ = writer.flush();
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        match event {
            DeployEvent::HostsResolved {
                selector,
                hosts,
                skipped_ids,
            } => self.emit(
                "hosts_resolved",
                json!({
                    "selector": selector,
                    "hosts": hosts.iter().map(host_json).collect::<Vec<_>>(),
                    "skipped_ids": skipped_ids,
                }),
            ),

            DeployEvent::StageStarted { host, stage } => self.emit(
                "stage_start",
                json!({
                    "host": host_json(&host),
                    "stage": stage.as_str(),
                }),
            ),

            DeployEvent::CommandFinished {
                host,
                stage,
                command,
                exit_code,
                duration,
            } => self.emit(
                "command_finished",
                json!({
                    "host": host_json(&host),
                    "stage": stage.as_str(),
                    "command": command,
                    "exit_code": exit_code,
                    "duration_ms": millis(duration),
                }),
            ),

            DeployEvent::HostFinished { outcome } => {
                self.emit("host_finished", outcome_json(&outcome))
            }

            DeployEvent::Completed { report } => self.emit("complete", report_json(&report)),
        }
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}

pub fn host_json(host: &Host) -> Value {
    json!({
        "id": host.id(),
        "address": host.address().to_string(),
    })
}

/// One host's outcome, as carried by `host_finished` and `complete`
pub fn outcome_json(outcome: &Outcome) -> Value {
    let error = outcome.error().map(|e| {
        json!({
            "kind": e.kind.as_str(),
            "message": e.message,
            "command": e.command,
        })
    });
    let stages: Vec<Value> = outcome
        .timings()
        .iter()
        .map(|t| json!({ "stage": t.stage.as_str(), "duration_ms": millis(t.duration) }))
        .collect();

    json!({
        "host": host_json(outcome.host()),
        "status": if outcome.is_success() { "done" } else { "failed" },
        "final_stage": outcome.final_stage().as_str(),
        "failed_stage": outcome.failed_stage().map(|s| s.as_str()),
        "error": error,
        "duration_ms": millis(outcome.total_duration()),
        "stages": stages,
    })
}

pub fn report_json(report: &DeployReport) -> Value {
    json!({
        "success": report.overall_succeeded,
        "succeeded": report.succeeded_count(),
        "failed": report.failed_count(),
        "outcomes": report.outcomes.iter().map(outcome_json).collect::<Vec<_>>(),
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
