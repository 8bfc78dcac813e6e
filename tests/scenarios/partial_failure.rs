//! Scenario: one bad host never takes the rest of the fleet down.

use std::net::Ipv4Addr;
use std::sync::Arc;

use drone_digitalocean::infrastructure::{JsonEventSink, RecordedOp, RecordingConnector};
use drone_digitalocean::presentation::{render_report, ConsoleEventSink, RenderContext};
use drone_digitalocean::{Config, DeployOptions, DeployUseCase, HostErrorKind, PipelineStage};

use crate::common::{droplet, FakeInventory, SharedBuffer};

fn ip(id: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, id)
}

fn config() -> Config {
    Config {
        tag: "web".to_string(),
        password: "hunter2".to_string(),
        pat: "token".to_string(),
        pre_sync: vec!["make build".to_string(), "make test".to_string()],
        post_sync: vec!["systemctl restart app".to_string()],
        ..Default::default()
    }
}

fn fleet() -> FakeInventory {
    FakeInventory::tagged(vec![droplet(1), droplet(2), droplet(3)])
}

fn flaky_connector() -> RecordingConnector {
    RecordingConnector::new()
        .fail_command(ip(2), "make build", 2, "make: *** No rule to make target")
        .refuse_connection(ip(3))
}

#[test]
fn failures_are_isolated_per_host() {
    let inventory = fleet();
    let connector = flaky_connector();

    let report = DeployUseCase::new(&inventory, &connector)
        .execute(&mut config(), &DeployOptions::new())
        .unwrap();

    assert!(!report.overall_succeeded);
    assert_eq!(report.succeeded_count(), 1);
    assert_eq!(report.failed_count(), 2);

    let [first, second, third] = &report.outcomes[..] else {
        panic!("expected three outcomes, got {:?}", report.outcomes);
    };
    assert!(first.is_success());

    assert_eq!(second.failed_stage(), Some(PipelineStage::PreSync));
    let error = second.error().unwrap();
    assert_eq!(error.kind, HostErrorKind::PreSync);
    assert_eq!(error.command.as_deref(), Some("make build"));
    assert!(error.message.starts_with("exit code 2"));

    assert_eq!(third.failed_stage(), Some(PipelineStage::Connecting));
    assert_eq!(third.error().unwrap().kind, HostErrorKind::Connection);

    // The failing command stops the pipeline: no second command, no copy
    assert_eq!(
        connector.ops_for(ip(2)).last(),
        Some(&RecordedOp::Command("make build".to_string()))
    );
    assert_eq!(connector.ops_for(ip(1)).len(), 5);
}

#[test]
fn copy_failure_skips_post_sync_only_on_that_host() {
    let inventory = fleet();
    let connector = RecordingConnector::new().fail_copy(ip(1), "rsync: connection unexpectedly closed");

    let report = DeployUseCase::new(&inventory, &connector)
        .execute(&mut config(), &DeployOptions::new())
        .unwrap();

    let failed: Vec<u64> = report.failures().map(|o| o.host().id()).collect();
    assert_eq!(failed, vec![1]);
    assert_eq!(report.outcomes[0].error().unwrap().kind, HostErrorKind::Sync);
    assert!(!connector
        .ops_for(ip(1))
        .contains(&RecordedOp::Command("systemctl restart app".to_string())));
    assert!(connector
        .ops_for(ip(2))
        .contains(&RecordedOp::Command("systemctl restart app".to_string())));
}

#[test]
fn console_and_report_describe_the_failures() {
    let inventory = fleet();
    let connector = flaky_connector();
    let progress = SharedBuffer::default();
    let ctx = RenderContext::plain(0);

    let report = DeployUseCase::new(&inventory, &connector)
        .with_event_sink(Arc::new(ConsoleEventSink::with_writer(progress.clone(), ctx)))
        .execute(&mut config(), &DeployOptions::new().with_concurrency(1))
        .unwrap();

    let progress = progress.text();
    assert!(progress.starts_with("Deploying to 3 host(s) selected by tag 'web'\n"));
    assert!(progress.contains("✓ 1 (10.0.0.1) done"));
    assert!(progress.contains("✗ 2 (10.0.0.2) failed at PreSync"));
    assert!(progress.contains("✗ 3 (10.0.0.3) failed at Connecting"));
    // Quiet console: no per-stage lines
    assert!(!progress.contains("● "));

    let rendered = render_report(&report, &ctx);
    assert!(rendered.contains("✗ 2 (10.0.0.2) PreSyncError at PreSync: `make build`: exit code 2"));
    assert!(rendered.ends_with("1 succeeded, 2 failed\n"));
    assert!(!rendered.contains("hunter2"));
}

#[test]
fn json_stream_records_failed_hosts() {
    let inventory = fleet();
    let connector = flaky_connector();
    let buffer = SharedBuffer::default();

    DeployUseCase::new(&inventory, &connector)
        .with_event_sink(Arc::new(JsonEventSink::with_writer(buffer.clone())))
        .execute(&mut config(), &DeployOptions::new())
        .unwrap();

    let events = buffer.json_lines();
    let finished: Vec<_> = events
        .iter()
        .filter(|e| e["event"] == "host_finished" && e["host"]["id"] == 2)
        .collect();
    assert_eq!(finished.len(), 1);
    let host = finished[0];
    assert_eq!(host["status"], "failed");
    assert_eq!(host["failed_stage"], "PreSync");
    assert_eq!(host["error"]["kind"], "PreSyncError");
    assert_eq!(host["error"]["command"], "make build");

    let complete = events.last().unwrap();
    assert_eq!(complete["success"], false);
    assert_eq!(complete["failed"], 2);
    assert_eq!(complete["outcomes"][2]["error"]["kind"], "ConnectionError");
    assert!(!buffer.text().contains("hunter2"));
}
