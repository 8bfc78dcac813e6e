//! Report Rendering
//!
//! Text and JSON renderings of a deploy plan (dry run) and a deploy report.

use std::time::Duration;

use serde_json::{json, Value};

use crate::application::DeployPlan;
use crate::domain::entities::Outcome;
use crate::domain::services::DeployReport;
use crate::infrastructure::events::host_json;

use super::context::RenderContext;
use super::text::{ColoredText, Icon};

/// One line per host in resolution order, then the summary
pub fn render_report(report: &DeployReport, ctx: &RenderContext) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        out.push_str(&outcome_line(outcome, ctx));
        out.push('\n');
        if ctx.verbose > 0 && !outcome.timings().is_empty() {
            out.push_str(&timings_line(outcome, ctx));
            out.push('\n');
        }
    }

    let summary = format!(
        "{} succeeded, {} failed",
        report.succeeded_count(),
        report.failed_count()
    );
    let summary = if report.overall_succeeded {
        ColoredText::success(summary)
    } else {
        ColoredText::error(summary)
    };
    out.push_str(&summary.bold().render(ctx.color));
    out.push('\n');
    out
}

/// `✓ 1 (10.0.0.1) done` or `✗ 2 (10.0.0.2) PreSyncError at PreSync: ...`
pub fn outcome_line(outcome: &Outcome, ctx: &RenderContext) -> String {
    match (outcome.error(), outcome.failed_stage()) {
        (Some(error), Some(stage)) => {
            let detail = match &error.command {
                Some(command) => format!("`{}`: {}", command, error.message),
                None => error.message.clone(),
            };
            format!(
                "{} {} {}: {}",
                Icon::Error.colored(ctx.color, ctx.unicode),
                outcome.host(),
                ColoredText::error(format!("{} at {}", error.kind, stage)).render(ctx.color),
                detail
            )
        }
        _ => format!(
            "{} {} done",
            Icon::Success.colored(ctx.color, ctx.unicode),
            outcome.host()
        ),
    }
}

fn timings_line(outcome: &Outcome, ctx: &RenderContext) -> String {
    let stages: Vec<String> = outcome
        .timings()
        .iter()
        .map(|t| format!("{} {}", t.stage, short_duration(t.duration)))
        .collect();
    format!(
        "    {} {}",
        Icon::Arrow.colored(ctx.color, ctx.unicode),
        ColoredText::dim(stages.join(", ")).render(ctx.color)
    )
}

/// Millisecond precision is enough for stage timings
pub fn short_duration(duration: Duration) -> String {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}

/// Hosts a dry run would deploy to
pub fn render_plan(plan: &DeployPlan, ctx: &RenderContext) -> String {
    let mut out = format!(
        "{} {} host(s) selected by {} (dry run, nothing deployed)\n",
        Icon::Progress.colored(ctx.color, ctx.unicode),
        plan.hosts.len(),
        plan.selector
    );
    for host in &plan.hosts {
        out.push_str(&format!("    {}\n", host));
    }
    if !plan.skipped_ids.is_empty() {
        out.push_str(&skipped_line(&plan.skipped_ids, ctx));
        out.push('\n');
    }
    out
}

pub(crate) fn skipped_line(skipped_ids: &[u64], ctx: &RenderContext) -> String {
    let ids: Vec<String> = skipped_ids.iter().map(u64::to_string).collect();
    format!(
        "{} {}",
        Icon::Warning.colored(ctx.color, ctx.unicode),
        ColoredText::warning(format!(
            "skipped droplets without a public IPv4: {}",
            ids.join(", ")
        ))
        .render(ctx.color)
    )
}

pub fn plan_json(plan: &DeployPlan) -> Value {
    json!({
        "selector": plan.selector,
        "hosts": plan.hosts.iter().map(host_json).collect::<Vec<_>>(),
        "skipped_ids": plan.skipped_ids,
        "credential": plan.credential.kind(),
    })
}
