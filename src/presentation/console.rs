//! Console Event Sink
//!
//! Human-readable progress on stderr while host pipelines run. The final
//! report is rendered separately once every host has finished.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{DeployEvent, DeployEventSink};

use super::context::RenderContext;
use super::report::{short_duration, skipped_line};
use super::text::{ColoredText, Icon};

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    ctx: RenderContext,
}

impl ConsoleEventSink {
    pub fn stderr(ctx: RenderContext) -> Self {
        Self::with_writer(io::stderr(), ctx)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, ctx: RenderContext) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            ctx,
        }
    }

    fn line(&self, text: String) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", text);
        }
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let ctx = &self.ctx;
        match event {
            DeployEvent::HostsResolved {
                selector,
                hosts,
                skipped_ids,
            } => {
                self.line(format!(
                    "Deploying to {} host(s) selected by {}",
                    hosts.len(),
                    ColoredText::plain(selector).bold().render(ctx.color)
                ));
                if !skipped_ids.is_empty() {
                    self.line(skipped_line(&skipped_ids, ctx));
                }
            }

            DeployEvent::StageStarted { host, stage } => self.line(format!(
                "{} {} {}",
                Icon::Progress.colored(ctx.color, ctx.unicode),
                host,
                stage
            )),

            DeployEvent::CommandFinished {
                host,
                command,
                exit_code,
                duration,
                ..
            } => {
                let status = match exit_code {
                    Some(code) => format!("exit {}", code),
                    None => "signal".to_string(),
                };
                let status = if exit_code == Some(0) {
                    ColoredText::dim(status)
                } else {
                    ColoredText::error(status)
                };
                self.line(format!(
                    "    {} {} `{}` {} in {}",
                    Icon::Arrow.colored(ctx.color, ctx.unicode),
                    host,
                    command,
                    status.render(ctx.color),
                    short_duration(duration)
                ));
            }

            DeployEvent::HostFinished { outcome } => {
                let line = match outcome.failed_stage() {
                    None => format!(
                        "{} {} done",
                        Icon::Success.colored(ctx.color, ctx.unicode),
                        outcome.host()
                    ),
                    Some(stage) => format!(
                        "{} {} failed at {}",
                        Icon::Error.colored(ctx.color, ctx.unicode),
                        outcome.host(),
                        stage
                    ),
                };
                self.line(line);
            }

            DeployEvent::Completed { .. } => {}
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.ctx.verbose > 0
    }
}
