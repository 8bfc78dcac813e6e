//! Event Sink Implementations
//!
//! - JsonEventSink: NDJSON output for CI/automation
//!
//! The human-readable console sink lives in the presentation layer.

mod json;

pub use json::{host_json, outcome_json, report_json, JsonEventSink};
