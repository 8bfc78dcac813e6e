//! Scenario: a healthy fleet receives the tree and its commands.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use drone_digitalocean::infrastructure::{JsonEventSink, RecordedOp, RecordingConnector};
use drone_digitalocean::{Config, DeployOptions, DeployUseCase};

use crate::common::{droplet, FakeInventory, SharedBuffer};

fn config() -> Config {
    Config {
        tag: "web".to_string(),
        key_path: "/keys/deploy".to_string(),
        pat: "token".to_string(),
        target_path: "/srv/app".to_string(),
        pre_sync: vec!["make build".to_string()],
        post_sync: vec!["systemctl restart app".to_string()],
        ..Default::default()
    }
}

fn expected_ops() -> Vec<RecordedOp> {
    vec![
        RecordedOp::Connect {
            user: "root".to_string(),
            port: 22,
        },
        RecordedOp::Command("make build".to_string()),
        RecordedOp::CopyTree {
            source: PathBuf::from("./"),
            target: "/srv/app".to_string(),
        },
        RecordedOp::Command("systemctl restart app".to_string()),
    ]
}

#[test]
fn every_tagged_droplet_runs_the_full_pipeline() {
    let inventory = FakeInventory::tagged(vec![droplet(1), droplet(2), droplet(3)]);
    let connector = RecordingConnector::new().with_command_delay(Duration::from_millis(10));
    let buffer = SharedBuffer::default();
    let use_case = DeployUseCase::new(&inventory, &connector)
        .with_event_sink(Arc::new(JsonEventSink::with_writer(buffer.clone())));

    let report = use_case
        .execute(&mut config(), &DeployOptions::new().with_concurrency(2))
        .unwrap();

    assert!(report.overall_succeeded);
    assert_eq!(report.succeeded_count(), 3);
    for id in 1..=3 {
        assert_eq!(connector.ops_for(Ipv4Addr::new(10, 0, 0, id)), expected_ops());
    }
    assert!(connector.max_concurrent_sessions() <= 2);

    let events = buffer.json_lines();
    assert_eq!(events.first().unwrap()["event"], "hosts_resolved");
    let complete = events.last().unwrap();
    assert_eq!(complete["event"], "complete");
    assert_eq!(complete["success"], true);
    assert_eq!(complete["succeeded"], 3);
    assert_eq!(
        events.iter().filter(|e| e["event"] == "host_finished").count(),
        3
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| e["event"] == "command_finished")
            .count(),
        6
    );
    assert!(events.iter().all(|e| e["timestamp"].is_string()));
}

#[test]
fn load_balancer_members_only() {
    let inventory = FakeInventory::behind_load_balancer(
        "lb1",
        &[2, 3],
        vec![droplet(1), droplet(2), droplet(3)],
    );
    let connector = RecordingConnector::new();
    let mut config = Config {
        loadbalancer: "lb1".to_string(),
        tag: String::new(),
        ..config()
    };

    let report = DeployUseCase::new(&inventory, &connector)
        .execute(&mut config, &DeployOptions::new())
        .unwrap();

    let ids: Vec<u64> = report.outcomes.iter().map(|o| o.host().id()).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(connector.ops_for(Ipv4Addr::new(10, 0, 0, 1)).is_empty());
}

#[test]
fn custom_user_and_port_reach_every_connection() {
    let inventory = FakeInventory::tagged(vec![droplet(4)]);
    let connector = RecordingConnector::new();
    let mut config = Config {
        user: "deploy".to_string(),
        port: 2222,
        pre_sync: vec![],
        post_sync: vec![],
        ..config()
    };

    let report = DeployUseCase::new(&inventory, &connector)
        .execute(&mut config, &DeployOptions::new())
        .unwrap();

    assert!(report.overall_succeeded);
    assert_eq!(
        connector.ops_for(Ipv4Addr::new(10, 0, 0, 4)),
        vec![
            RecordedOp::Connect {
                user: "deploy".to_string(),
                port: 2222,
            },
            RecordedOp::CopyTree {
                source: PathBuf::from("./"),
                target: "/srv/app".to_string(),
            },
        ]
    );
}
