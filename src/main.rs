//! drone-digitalocean - Drone plugin deploying to DigitalOcean droplets
//!
//! Usage: drone-digitalocean (--loadbalancer <NAME> | --tag <TAG>) --pat <TOKEN> [OPTIONS]
//!
//! Exit code 0 iff every selected droplet completed every stage.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use drone_digitalocean::config::{load_env_file, EnvFileStatus};
use drone_digitalocean::domain::ports::DeployEventSink;
use drone_digitalocean::infrastructure::{DigitalOceanClient, JsonEventSink, OpenSshConnector};
use drone_digitalocean::presentation::terminal::Stream;
use drone_digitalocean::presentation::{
    plan_json, render_plan, render_report, ConsoleEventSink, RenderContext,
};
use drone_digitalocean::{CancellationToken, DeployError, DeployOptions, DeployUseCase};

use cli::Cli;

fn main() -> ExitCode {
    // Before parsing, so the file can supply PLUGIN_* values
    let env_file = load_env_file();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &env_file {
        EnvFileStatus::NotConfigured => {}
        EnvFileStatus::Loaded(path) => debug!(path = %path.display(), "env file loaded"),
        EnvFileStatus::Failed { path, message } => {
            warn!(path = %path.display(), error = %message, "env file ignored")
        }
    }

    let json_sink = cli.json.then(|| Arc::new(JsonEventSink::stdout()));
    match run(&cli, json_sink.clone()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(sink) = json_sink {
                sink.emit(
                    "error",
                    json!({ "code": error_code(&e), "message": format!("{:#}", e) }),
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, json_sink: Option<Arc<JsonEventSink>>) -> Result<ExitCode> {
    let mut config = cli
        .to_config(|key| std::env::var(key).ok())
        .map_err(anyhow::Error::msg)?;

    let ctx = RenderContext::detect(Stream::Stdout, cli.verbose);
    let progress_ctx = RenderContext::detect(Stream::Stderr, cli.verbose);
    let sink: Arc<dyn DeployEventSink> = match &json_sink {
        Some(sink) => sink.clone() as Arc<dyn DeployEventSink>,
        None => Arc::new(ConsoleEventSink::stderr(progress_ctx)) as Arc<dyn DeployEventSink>,
    };

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("Cancelling deploy...");
        handler_token.cancel();
    }) {
        warn!(error = %e, "could not install the Ctrl+C handler");
    }

    let inventory = DigitalOceanClient::with_base_url(&config.pat, &cli.api_url)
        .context("could not create the DigitalOcean client")?;
    let connector = OpenSshConnector::new();
    let use_case = DeployUseCase::new(&inventory, &connector)
        .with_event_sink(sink)
        .with_cancellation(cancel);

    let plan = use_case.plan(&mut config)?;

    if cli.dry_run {
        match &json_sink {
            Some(sink) => sink.emit("plan", plan_json(&plan)),
            None => print!("{}", render_plan(&plan, &ctx)),
        }
        return Ok(ExitCode::SUCCESS);
    }

    connector
        .preflight(&plan.credential)
        .map_err(DeployError::Transport)?;
    info!(
        transfer = connector.transfer_method().unwrap_or("none"),
        "transport ready"
    );

    let options = DeployOptions::new().with_concurrency(cli.concurrency);
    let report = use_case.run(&plan, &config, &options);

    // In JSON mode the `complete` event already carries the report
    if json_sink.is_none() {
        print!("{}", render_report(&report, &ctx));
    }

    Ok(if report.overall_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `RUST_LOG` wins; otherwise -v raises this crate's level
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,drone_digitalocean={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn error_code(error: &anyhow::Error) -> &'static str {
    match error.downcast_ref::<DeployError>() {
        Some(e) => e.code(),
        None => "Error",
    }
}
