//! Presentation Layer
//!
//! Human-facing output: terminal capability detection, design tokens,
//! live progress on stderr and the final report (text or JSON).
//!
//! ## Structure
//!
//! - `console` - Progress event sink
//! - `report` - Plan and report rendering

mod console;
mod context;
pub mod report;
pub mod terminal;
pub mod text;
pub mod theme;

pub use console::ConsoleEventSink;
pub use context::RenderContext;
pub use report::{plan_json, render_plan, render_report};
